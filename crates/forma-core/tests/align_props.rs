//! Property tests for alignment placement.

use forma_core::{Align, Placement, Rect, Size};
use proptest::prelude::*;

fn placement() -> impl Strategy<Value = Placement> {
    prop::sample::select(Placement::ALL.to_vec())
}

fn area() -> impl Strategy<Value = Rect> {
    (-500..500i32, -500..500i32, 1..400i32, 1..400i32).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn outside_maps_to_mirrored_inside(p in placement(), r in area()) {
        prop_assume!(p != Placement::Center);
        let (mapped, phantom) = Align::outside(p).outside_mapping(r);

        prop_assert!(mapped.is_inside());
        prop_assert_ne!(mapped.placement(), p);
        prop_assert_eq!(phantom.size, r.size);
        // The phantom box touches the reference box without overlapping it.
        prop_assert!(phantom.intersect(&r).is_none());
        prop_assert!(phantom.inflate(1).intersect(&r).is_some());
    }

    #[test]
    fn outside_items_never_cover_the_box(
        p in placement(),
        r in area(),
        w in 1..200i32,
        h in 1..200i32,
    ) {
        prop_assume!(p != Placement::Center);
        let at = Align::outside(p).place(r, Size::new(w, h), Size::ZERO);
        let item = Rect::new(at.x, at.y, w, h);
        prop_assert!(item.intersect(&r).is_none());
    }

    #[test]
    fn inside_outside_conversion_roundtrips(p in placement()) {
        let a = Align::outside(p);
        prop_assert_eq!(a.to_inside().to_outside(), a);
        prop_assert_eq!(Align::from_bits(a.to_inside().bits()), a.to_inside());
    }
}

#[test]
fn center_maps_to_itself() {
    let r = Rect::new(5, 5, 50, 20);
    let (mapped, phantom) = Align::CENTER.outside_mapping(r);
    assert_eq!(mapped, Align::CENTER);
    assert_eq!(phantom, r);
    assert_eq!(Align::CENTER.to_inside(), Align::CENTER);
    assert_eq!(Align::CENTER.to_outside(), Align::CENTER);
}
