use super::*;

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(!token.is_cancelled());
    clone.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn flattened_pixel_lookup_and_bounds() {
    let img = FlattenedImage {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: false,
    };
    assert_eq!(img.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(img.pixel(2, 0), None);
    assert_eq!(img.pixel(0, 1), None);
}

#[test]
fn straight_conversion_only_touches_premultiplied_data() {
    let premul = FlattenedImage {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    assert_eq!(premul.to_straight_rgba8(), vec![128, 0, 0, 128]);

    let straight = FlattenedImage {
        premultiplied: false,
        ..premul
    };
    assert_eq!(straight.to_straight_rgba8(), vec![64, 0, 0, 128]);
}

#[test]
fn default_settings_have_no_font() {
    assert!(RenderSettings::default().font.is_none());
}

#[test]
fn create_cpu_backend_renders_plans() {
    let mut backend = create_backend(BackendKind::Cpu, &RenderSettings::default()).unwrap();
    let base = BaseImage::solid(2, 2, [9, 9, 9, 255]).unwrap();
    let plan = CompositePlan {
        width: 2,
        height: 2,
        ops: vec![],
    };
    let out = backend
        .render_plan(&plan, &base, &CancelToken::new())
        .unwrap();
    assert_eq!(out.data, *base.rgba8_premul);
}

#[test]
fn pixel_on_short_buffer_is_none() {
    let img = FlattenedImage {
        width: 2,
        height: 2,
        data: vec![1, 2, 3, 4, 5, 6],
        premultiplied: true,
    };
    assert_eq!(img.pixel(0, 0), Some([1, 2, 3, 4]));
    assert_eq!(img.pixel(1, 0), None);
    assert_eq!(img.pixel(1, 1), None);
}
