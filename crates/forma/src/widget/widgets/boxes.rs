//! Passive widgets: boxes, frames, labelled frames, text and canvases.
//!
//! None of these react to input. They draw their box and label and that is
//! all, except for the canvas which hands its area to an application
//! painter.

use forma_core::{Align, Event, EventKind, Placement, Point, Rect, Result, ReturnFlags};
use forma_render::{BoxType, Color, DrawSurface};

use crate::form::{FormId, Forms};
use crate::widget::{HandlerContext, WidgetClass, WidgetHandler, WidgetId};

/// The box styles a plain box widget comes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoxKind {
    NoBox,
    #[default]
    Up,
    Down,
    Border,
    Shadow,
    Frame,
    Flat,
    Embossed,
}

impl From<BoxKind> for BoxType {
    fn from(kind: BoxKind) -> Self {
        match kind {
            BoxKind::NoBox => BoxType::NoBox,
            BoxKind::Up => BoxType::UpBox,
            BoxKind::Down => BoxType::DownBox,
            BoxKind::Border => BoxType::BorderBox,
            BoxKind::Shadow => BoxType::ShadowBox,
            BoxKind::Frame => BoxType::FrameBox,
            BoxKind::Flat => BoxType::FlatBox,
            BoxKind::Embossed => BoxType::EmbossedBox,
        }
    }
}

/// How a frame's border is drawn. Frames draw around their box, never
/// inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameKind {
    Up,
    Down,
    #[default]
    Engraved,
    Embossed,
    Border,
}

/// Paints a canvas' area. Gets the surface and the canvas box.
pub type CanvasPainter = Box<dyn FnMut(&mut dyn DrawSurface, Rect)>;

enum Role {
    Box,
    Frame(FrameKind),
    LabelFrame(FrameKind),
    Text,
    Canvas(Option<CanvasPainter>),
}

/// Handler of the passive widget classes.
pub struct PassiveHandler {
    role: Role,
}

impl PassiveHandler {
    fn new(role: Role) -> Self {
        Self { role }
    }

    fn draw(&mut self, ctx: &mut HandlerContext<'_>) {
        match &mut self.role {
            Role::Box => {
                ctx.draw_box();
                if ctx.widget().label_inside() {
                    ctx.draw_label();
                }
            }
            Role::Text => {
                ctx.draw_box();
                ctx.draw_label();
            }
            Role::Frame(kind) => {
                draw_frame(ctx, *kind);
                if ctx.widget().label_inside() {
                    ctx.draw_label();
                }
            }
            Role::LabelFrame(kind) => {
                draw_frame(ctx, *kind);
                draw_frame_label(ctx);
            }
            Role::Canvas(painter) => {
                ctx.draw_box();
                if let Some(paint) = painter.as_mut() {
                    let (w, surface) = ctx.painter();
                    paint(surface, w.area);
                }
            }
        }
    }
}

impl WidgetHandler for PassiveHandler {
    fn handle(&mut self, ctx: &mut HandlerContext<'_>, event: &Event) -> ReturnFlags {
        match event.kind {
            EventKind::Draw => self.draw(ctx),
            EventKind::DrawLabel => {
                if !matches!(self.role, Role::LabelFrame(_) | Role::Text) {
                    ctx.draw_label_outside();
                }
            }
            _ => {}
        }
        ReturnFlags::NONE
    }
}

/// Bevel or outline around the widget's box, `|bw|` pixels wide.
fn draw_frame(ctx: &mut HandlerContext<'_>, kind: FrameKind) {
    let (w, surface) = ctx.painter();
    let b = w.bw.abs().max(1);
    let outer = w.area.inflate(b);
    match kind {
        FrameKind::Border => {
            for i in 0..b {
                surface.stroke_rect(outer.inflate(-i), w.col1);
            }
        }
        FrameKind::Up => bevel_lines(surface, outer, b, Color::TOP_BCOL, Color::BOTTOM_BCOL),
        FrameKind::Down => bevel_lines(surface, outer, b, Color::BOTTOM_BCOL, Color::TOP_BCOL),
        FrameKind::Engraved => {
            let half = (b / 2).max(1);
            bevel_lines(surface, outer, half, Color::BOTTOM_BCOL, Color::TOP_BCOL);
            bevel_lines(surface, outer.inflate(-half), half, Color::TOP_BCOL, Color::BOTTOM_BCOL);
        }
        FrameKind::Embossed => {
            let half = (b / 2).max(1);
            bevel_lines(surface, outer, half, Color::TOP_BCOL, Color::BOTTOM_BCOL);
            bevel_lines(surface, outer.inflate(-half), half, Color::BOTTOM_BCOL, Color::TOP_BCOL);
        }
    }
}

fn bevel_lines(surface: &mut dyn DrawSurface, rect: Rect, width: i32, light: Color, dark: Color) {
    for i in 0..width {
        let r = rect.inflate(-i);
        let (x0, y0) = (r.x(), r.y());
        let (x1, y1) = (r.right() - 1, r.bottom() - 1);
        surface.draw_line(Point::new(x0, y0), Point::new(x1, y0), light);
        surface.draw_line(Point::new(x0, y0), Point::new(x0, y1), light);
        surface.draw_line(Point::new(x1, y0), Point::new(x1, y1), dark);
        surface.draw_line(Point::new(x0, y1), Point::new(x1, y1), dark);
    }
}

/// The label of a labelled frame sits on the top border, near the left
/// corner, over a patch of the label background.
fn draw_frame_label(ctx: &mut HandlerContext<'_>) {
    let (w, surface) = ctx.painter();
    if w.label.is_empty() {
        return;
    }
    let font = w.label_font();
    let extent = surface.text_extent(&w.label, font);
    let at = Point::new(w.area.x() + 10, w.area.y() - extent.height / 2);
    surface.fill_rect(Rect::new(at.x - 2, at.y, extent.width + 4, extent.height), w.col2);
    surface.draw_text(at, &w.label, font, w.lcol);
}

impl Forms {
    #[allow(clippy::too_many_arguments)]
    fn create_passive(
        &mut self,
        class: WidgetClass,
        role: Role,
        boxtype: BoxType,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> WidgetId {
        let id = self.create_widget(class, Some(Box::new(PassiveHandler::new(role))), x, y, w, h, label);
        self.widgets[id].boxtype = boxtype;
        id
    }

    /// Create a detached box.
    pub fn create_box(&mut self, kind: BoxKind, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        self.create_passive(WidgetClass::Box, Role::Box, kind.into(), x, y, w, h, label)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_box(
        &mut self,
        form: FormId,
        kind: BoxKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_box(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    /// Create a detached frame. The frame is drawn outside of the given box.
    pub fn create_frame(&mut self, kind: FrameKind, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_passive(WidgetClass::Frame, Role::Frame(kind), BoxType::NoBox, x, y, w, h, label);
        self.widgets[id].col1 = Color::BLACK;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_frame(
        &mut self,
        form: FormId,
        kind: FrameKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_frame(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    /// Create a detached frame with its label set into the top border.
    pub fn create_labelframe(&mut self, kind: FrameKind, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_passive(
            WidgetClass::LabelFrame,
            Role::LabelFrame(kind),
            BoxType::NoBox,
            x,
            y,
            w,
            h,
            label,
        );
        let widget = &mut self.widgets[id];
        widget.col1 = Color::BLACK;
        widget.col2 = Color::COL1;
        widget.align = Align::inside(Placement::LeftTop);
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_labelframe(
        &mut self,
        form: FormId,
        kind: FrameKind,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        label: &str,
    ) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_labelframe(kind, x, y, w, h, label);
        self.place(Some(form), id)
    }

    /// Create a detached text widget: a flat box with its label drawn
    /// left-aligned inside.
    pub fn create_text(&mut self, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_passive(WidgetClass::Text, Role::Text, BoxType::FlatBox, x, y, w, h, label);
        self.widgets[id].align = Align::inside(Placement::Left);
        id
    }

    pub fn add_text(&mut self, form: FormId, x: i32, y: i32, w: i32, h: i32, label: &str) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_text(x, y, w, h, label);
        self.place(Some(form), id)
    }

    /// Create a detached canvas. Its label goes above the box.
    pub fn create_canvas(&mut self, x: i32, y: i32, w: i32, h: i32, label: &str) -> WidgetId {
        let id = self.create_passive(WidgetClass::Canvas, Role::Canvas(None), BoxType::FlatBox, x, y, w, h, label);
        let widget = &mut self.widgets[id];
        widget.col1 = Color::BLACK;
        widget.align = Align::TOP;
        id
    }

    pub fn add_canvas(&mut self, form: FormId, x: i32, y: i32, w: i32, h: i32, label: &str) -> Result<WidgetId> {
        self.form_ref(form)?;
        let id = self.create_canvas(x, y, w, h, label);
        self.place(Some(form), id)
    }

    /// Install the closure that paints a canvas after its background.
    pub fn set_canvas_painter(
        &mut self,
        id: WidgetId,
        painter: impl FnMut(&mut dyn DrawSurface, Rect) + 'static,
    ) -> Result<()> {
        let handler = self.class_handler_mut::<PassiveHandler>(id, "canvas")?;
        let Role::Canvas(slot) = &mut handler.role else {
            return Err(crate::form::misuse(forma_core::FormsError::WrongClass { expected: "canvas" }));
        };
        *slot = Some(Box::new(painter));
        self.mark_for_redraw(id);
        self.flush_pending_redraws();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use forma_core::{FormsConfig, FormsError};
    use forma_render::{DrawOp, RecordingSurface, WindowHandle};

    use super::*;

    fn shown() -> (Forms, FormId) {
        let mut forms = Forms::with_config(RecordingSurface::new(), FormsConfig::default());
        let form = forms.create_form(200, 200, "");
        forms.show_form(form, WindowHandle(1)).unwrap();
        (forms, form)
    }

    fn texts(forms: &Forms) -> Vec<String> {
        forms.surface_as::<RecordingSurface>().unwrap().texts().into_iter().map(str::to_owned).collect()
    }

    #[test]
    fn test_box_draws_inside_label() {
        let (mut forms, form) = shown();
        let id = forms.add_box(form, BoxKind::Up, 10, 10, 60, 20, "hello").unwrap();
        assert_eq!(forms.widget(id).unwrap().boxtype(), BoxType::UpBox);
        assert!(texts(&forms).iter().any(|t| t == "hello"));
    }

    #[test]
    fn test_no_box_outside_label_only() {
        let (mut forms, form) = shown();
        let id = forms.create_box(BoxKind::NoBox, 50, 50, 20, 20, "side");
        forms.set_label_align(id, Align::RIGHT).unwrap();
        forms.attach(form, id).unwrap();
        let surface = forms.surface_as::<RecordingSurface>().unwrap();
        let text_at = surface.commands().iter().find_map(|c| match &c.op {
            DrawOp::Text { text, at, .. } if text == "side" => Some(*at),
            _ => None,
        });
        assert!(text_at.is_some_and(|at| at.x >= 70));
    }

    #[test]
    fn test_frame_bbox_covers_border() {
        let (mut forms, form) = shown();
        let id = forms.add_frame(form, FrameKind::Engraved, 20, 20, 40, 40, "").unwrap();
        forms.set_border_width(id, 2).unwrap();
        assert_eq!(forms.bbox(id), Rect::new(18, 18, 44, 44));
        assert_eq!(forms.widget(id).unwrap().class(), WidgetClass::Frame);
    }

    #[test]
    fn test_labelframe_draws_its_label() {
        let (mut forms, form) = shown();
        forms.add_labelframe(form, FrameKind::Engraved, 20, 30, 100, 50, "Options").unwrap();
        assert!(texts(&forms).iter().any(|t| t == "Options"));
    }

    #[test]
    fn test_canvas_painter_runs_with_box() {
        let (mut forms, form) = shown();
        let id = forms.add_canvas(form, 10, 10, 30, 30, "").unwrap();
        let seen = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        forms
            .set_canvas_painter(id, move |_, area| s.set(Some(area)))
            .unwrap();
        assert_eq!(seen.get(), Some(Rect::new(10, 10, 30, 30)));
    }

    #[test]
    fn test_canvas_painter_needs_canvas() {
        let (mut forms, form) = shown();
        let id = forms.add_text(form, 0, 0, 50, 20, "t").unwrap();
        assert!(matches!(
            forms.set_canvas_painter(id, |_, _| {}),
            Err(FormsError::WrongClass { expected: "canvas" })
        ));
    }
}
