//! The widget record.
//!
//! A [`Widget`] holds everything the engine knows about one control: its
//! geometry (both the integer box and the high-precision offsets used for
//! drift-free rescaling), its looks, its state flags and its links into the
//! form list and the composite tree. Class specific state lives in the
//! widget's [`WidgetHandler`](super::WidgetHandler).

use std::fmt;
use std::time::Duration;

use forma_core::{Align, Rect, ReturnFlags, TimerId};
use forma_render::{BoxType, Color, FontSpec, FontStyle};

use super::traits::{Callback, PostHandler, PreHandler, WidgetHandler};
use super::WidgetId;
use crate::form::FormId;

/// The class of a widget.
///
/// The class decides a few engine policies (group markers are skipped
/// everywhere, canvases and frames get padded intersection boxes, free
/// widgets are clipped to their box while drawing). Everything else is up
/// to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetClass {
    /// Pseudo-widget opening a group.
    BeginGroup,
    /// Pseudo-widget closing a group.
    EndGroup,
    Box,
    Frame,
    LabelFrame,
    Text,
    Button,
    Input,
    Slider,
    ValSlider,
    Spinner,
    Textbox,
    Clock,
    Canvas,
    /// A widget drawing with an application supplied handler.
    Free,
    /// An application defined class.
    Custom(u16),
}

impl WidgetClass {
    #[inline]
    pub fn is_group_marker(self) -> bool {
        matches!(self, WidgetClass::BeginGroup | WidgetClass::EndGroup)
    }

    pub fn name(self) -> &'static str {
        match self {
            WidgetClass::BeginGroup => "begin-group",
            WidgetClass::EndGroup => "end-group",
            WidgetClass::Box => "box",
            WidgetClass::Frame => "frame",
            WidgetClass::LabelFrame => "labelframe",
            WidgetClass::Text => "text",
            WidgetClass::Button => "button",
            WidgetClass::Input => "input",
            WidgetClass::Slider => "slider",
            WidgetClass::ValSlider => "valslider",
            WidgetClass::Spinner => "spinner",
            WidgetClass::Textbox => "textbox",
            WidgetClass::Clock => "clock",
            WidgetClass::Canvas => "canvas",
            WidgetClass::Free => "free",
            WidgetClass::Custom(_) => "custom",
        }
    }
}

/// Which dimensions follow a form resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizePolicy {
    None,
    X,
    Y,
    #[default]
    All,
}

impl ResizePolicy {
    pub fn resizes_x(self) -> bool {
        matches!(self, ResizePolicy::X | ResizePolicy::All)
    }

    pub fn resizes_y(self) -> bool {
        matches!(self, ResizePolicy::Y | ResizePolicy::All)
    }
}

/// Which edge or corner of a widget stays put when it changes size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Gravity {
    #[default]
    NoGravity,
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Gravity {
    pub fn pins_left(self) -> bool {
        matches!(self, Gravity::NorthWest | Gravity::West | Gravity::SouthWest)
    }

    pub fn pins_right(self) -> bool {
        matches!(self, Gravity::NorthEast | Gravity::East | Gravity::SouthEast)
    }

    pub fn pins_top(self) -> bool {
        matches!(self, Gravity::NorthWest | Gravity::North | Gravity::NorthEast)
    }

    pub fn pins_bottom(self) -> bool {
        matches!(self, Gravity::SouthWest | Gravity::South | Gravity::SouthEast)
    }
}

/// High-precision distances of a widget's edges from the form's edges.
///
/// `fl1`/`fr1` are the distances of the left edge from the form's left and
/// right side, `fl2`/`fr2` those of the right edge; `ft*`/`fb*` likewise
/// vertically. Integer geometry is always re-derived from these, so any
/// number of rescalings never accumulates round-off.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HrOffsets {
    pub fl1: f64,
    pub fr1: f64,
    pub ft1: f64,
    pub fb1: f64,
    pub fl2: f64,
    pub fr2: f64,
    pub ft2: f64,
    pub fb2: f64,
}

impl HrOffsets {
    /// Offsets of `area` inside a form of `form_w` x `form_h`.
    pub fn from_area(area: Rect, form_w: f64, form_h: f64) -> Self {
        let fl1 = f64::from(area.x());
        let ft1 = f64::from(area.y());
        let fl2 = fl1 + f64::from(area.width());
        let ft2 = ft1 + f64::from(area.height());
        Self {
            fl1,
            fr1: form_w - fl1,
            ft1,
            fb1: form_h - ft1,
            fl2,
            fr2: form_w - fl2,
            ft2,
            fb2: form_h - ft2,
        }
    }

    pub fn width(&self) -> f64 {
        self.fl2 - self.fl1
    }

    pub fn height(&self) -> f64 {
        self.ft2 - self.ft1
    }
}

/// One widget.
pub struct Widget {
    pub(crate) class: WidgetClass,
    pub(crate) form: Option<FormId>,
    pub(crate) area: Rect,
    pub(crate) hr: HrOffsets,

    pub(crate) boxtype: BoxType,
    pub(crate) bw: i32,
    pub(crate) col1: Color,
    pub(crate) col2: Color,
    pub(crate) lcol: Color,
    pub(crate) label: String,
    pub(crate) align: Align,
    pub(crate) lstyle: FontStyle,
    pub(crate) lsize: i32,
    pub(crate) resize: ResizePolicy,
    pub(crate) nwgravity: Gravity,
    pub(crate) segravity: Gravity,

    pub(crate) handler: Option<Box<dyn WidgetHandler>>,
    pub(crate) prehandler: Option<Box<dyn PreHandler>>,
    pub(crate) posthandler: Option<Box<dyn PostHandler>>,
    pub(crate) callback: Option<Callback>,

    pub(crate) visible: bool,
    pub(crate) active: bool,
    pub(crate) input: bool,
    pub(crate) wants_special_keys: bool,
    pub(crate) automatic: bool,
    pub(crate) is_under: bool,
    pub(crate) redraw: bool,
    pub(crate) dbl_buffer: bool,
    pub(crate) dbl_background: Color,
    pub(crate) clip: bool,
    pub(crate) pushed: bool,
    pub(crate) focus: bool,
    pub(crate) belowmouse: bool,
    pub(crate) radio: bool,
    pub(crate) want_update: bool,

    pub(crate) returned: ReturnFlags,
    pub(crate) how_return: ReturnFlags,
    pub(crate) click_timeout: Duration,
    pub(crate) shortcuts: Vec<i64>,
    pub(crate) tooltip: Option<String>,
    pub(crate) tip_timer: Option<TimerId>,

    pub(crate) group_id: u32,
    pub(crate) parent: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
}

impl Widget {
    pub(crate) fn new(class: WidgetClass, area: Rect, label: &str, bw: i32) -> Self {
        Self {
            class,
            form: None,
            area,
            hr: HrOffsets::default(),
            boxtype: BoxType::NoBox,
            bw,
            col1: Color::COL1,
            col2: Color::MCOL,
            lcol: Color::BLACK,
            label: label.to_owned(),
            align: Align::CENTER,
            lstyle: FontStyle::Normal,
            lsize: FontSpec::DEFAULT_SIZE,
            resize: ResizePolicy::All,
            nwgravity: Gravity::NoGravity,
            segravity: Gravity::NoGravity,
            handler: None,
            prehandler: None,
            posthandler: None,
            callback: None,
            visible: true,
            active: true,
            input: false,
            wants_special_keys: false,
            automatic: false,
            is_under: false,
            redraw: false,
            dbl_buffer: false,
            dbl_background: Color::COL1,
            clip: false,
            pushed: false,
            focus: false,
            belowmouse: false,
            radio: false,
            want_update: false,
            returned: ReturnFlags::NONE,
            how_return: ReturnFlags::ALWAYS,
            click_timeout: Duration::ZERO,
            shortcuts: Vec::new(),
            tooltip: None,
            tip_timer: None,
            group_id: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    #[inline]
    pub fn class(&self) -> WidgetClass {
        self.class
    }

    /// The form the widget is attached to.
    #[inline]
    pub fn form(&self) -> Option<FormId> {
        self.form
    }

    /// The widget's box in form coordinates.
    #[inline]
    pub fn geometry(&self) -> Rect {
        self.area
    }

    pub fn hr_offsets(&self) -> HrOffsets {
        self.hr
    }

    pub fn boxtype(&self) -> BoxType {
        self.boxtype
    }

    pub fn border_width(&self) -> i32 {
        self.bw
    }

    pub fn colors(&self) -> (Color, Color) {
        (self.col1, self.col2)
    }

    pub fn label_color(&self) -> Color {
        self.lcol
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn label_align(&self) -> Align {
        self.align
    }

    pub fn label_font(&self) -> FontSpec {
        FontSpec::new(self.lstyle, self.lsize)
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        self.resize
    }

    pub fn gravity(&self) -> (Gravity, Gravity) {
        (self.nwgravity, self.segravity)
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the widget takes keyboard input.
    pub fn is_input(&self) -> bool {
        self.input
    }

    pub fn is_automatic(&self) -> bool {
        self.automatic
    }

    /// Whether a later widget of the same form overlaps this one.
    pub fn is_under(&self) -> bool {
        self.is_under
    }

    /// Whether the widget is marked for the next redraw pass.
    pub fn needs_redraw(&self) -> bool {
        self.redraw
    }

    pub fn is_double_buffered(&self) -> bool {
        self.dbl_buffer
    }

    pub fn has_focus(&self) -> bool {
        self.focus
    }

    pub fn is_pushed(&self) -> bool {
        self.pushed
    }

    pub fn is_below_mouse(&self) -> bool {
        self.belowmouse
    }

    pub fn wants_update(&self) -> bool {
        self.want_update
    }

    /// The result of the last interaction, after the return policy was applied.
    pub fn returned(&self) -> ReturnFlags {
        self.returned
    }

    pub fn return_policy(&self) -> ReturnFlags {
        self.how_return
    }

    pub fn click_timeout(&self) -> Duration {
        self.click_timeout
    }

    pub fn shortcuts(&self) -> &[i64] {
        &self.shortcuts
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }

    /// Non-zero while the widget is a member of a group.
    pub fn group_id(&self) -> u32 {
        self.group_id
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Label drawn inside the box rather than beside it.
    pub(crate) fn label_inside(&self) -> bool {
        self.align.is_inside()
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("class", &self.class)
            .field("label", &self.label)
            .field("area", &self.area)
            .field("form", &self.form)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .field("group_id", &self.group_id)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_from_area() {
        let hr = HrOffsets::from_area(Rect::new(10, 20, 100, 50), 500.0, 300.0);
        assert_eq!(hr.fl1, 10.0);
        assert_eq!(hr.fr1, 490.0);
        assert_eq!(hr.fl2, 110.0);
        assert_eq!(hr.fr2, 390.0);
        assert_eq!(hr.ft2, 70.0);
        assert_eq!(hr.fb2, 230.0);
        assert_eq!(hr.width(), 100.0);
    }

    #[test]
    fn test_gravity_pins() {
        assert!(Gravity::NorthWest.pins_left());
        assert!(Gravity::NorthWest.pins_top());
        assert!(!Gravity::North.pins_left());
        assert!(Gravity::SouthEast.pins_right());
        assert!(Gravity::SouthEast.pins_bottom());
        assert!(!Gravity::NoGravity.pins_bottom());
    }

    #[test]
    fn test_markers() {
        assert!(WidgetClass::BeginGroup.is_group_marker());
        assert!(!WidgetClass::Slider.is_group_marker());
        assert_eq!(WidgetClass::Custom(3).name(), "custom");
    }
}
