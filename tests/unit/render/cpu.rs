use super::*;
use crate::{
    compose::plan::{TextStyle, compile_plan},
    foundation::core::Size,
    geometry::fit::DisplayGeometry,
    overlay::model::OverlayModel,
};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);

fn plan_for(model: &OverlayModel, base: &BaseImage, viewport: Size) -> CompositePlan {
    let geo = DisplayGeometry::aspect_fit(base.width, base.height, viewport).unwrap();
    compile_plan(
        base.width,
        base.height,
        model.snapshot().overlays(),
        &geo,
        &TextStyle::default(),
    )
    .unwrap()
}

fn render(plan: &CompositePlan, base: &BaseImage) -> FlattenedImage {
    CpuBackend::new(RenderSettings::default())
        .render_plan(plan, base, &CancelToken::new())
        .unwrap()
}

#[test]
fn zero_overlays_copy_the_base_exactly() {
    let base = BaseImage::from_rgba8(
        3,
        2,
        vec![
            1, 2, 3, 255, 4, 5, 6, 255, 7, 8, 9, 255, //
            10, 11, 12, 255, 13, 14, 15, 128, 0, 0, 0, 0,
        ],
    )
    .unwrap();
    let plan = plan_for(&OverlayModel::new(), &base, Size::new(30.0, 20.0));
    let out = render(&plan, &base);
    assert_eq!((out.width, out.height), (3, 2));
    assert!(out.premultiplied);
    assert_eq!(out.data, *base.rgba8_premul);
}

#[test]
fn output_matches_native_resolution_not_viewport() {
    let base = BaseImage::solid(120, 80, WHITE).unwrap();
    let mut model = OverlayModel::new();
    model.add_overlay("A", Point::new(10.0, 10.0)).unwrap();
    let plan = plan_for(&model, &base, Size::new(30.0, 20.0));
    let out = render(&plan, &base);
    assert_eq!((out.width, out.height), (120, 80));
    assert_eq!(out.data.len(), 120 * 80 * 4);
}

#[test]
fn later_overlays_paint_on_top() {
    let base = BaseImage::solid(64, 64, WHITE).unwrap();
    let mut model = OverlayModel::new();
    let a = model
        .add_overlay_with_color("M", Point::new(32.0, 32.0), RED)
        .unwrap();
    let b = model
        .add_overlay_with_color("M", Point::new(36.0, 32.0), BLUE)
        .unwrap();
    model.update_scale(a, 2.0).unwrap();
    model.update_scale(b, 2.0).unwrap();

    let out = render(&plan_for(&model, &base, Size::new(64.0, 64.0)), &base);
    assert_eq!(out.pixel(32, 32), Some([0, 0, 255, 255]), "overlap shows B");
    assert_eq!(out.pixel(25, 32), Some([255, 0, 0, 255]), "A-only region");
    assert_eq!(out.pixel(43, 32), Some([0, 0, 255, 255]), "B-only region");
    assert_eq!(out.pixel(5, 5), Some(WHITE), "untouched base");
}

#[test]
fn rendering_is_pixel_identical_across_runs() {
    let base = BaseImage::solid(80, 60, [30, 60, 90, 255]).unwrap();
    let mut model = OverlayModel::new();
    model
        .add_overlay_with_color("Hello there", Point::new(20.0, 15.0), RED)
        .unwrap();
    model.add_overlay("x\ny", Point::new(33.3, 41.7)).unwrap();
    let plan = plan_for(&model, &base, Size::new(40.0, 30.0));

    let first = render(&plan, &base);
    let second = render(&plan, &base);
    assert_eq!(first, second);
    assert_ne!(first.data, *base.rgba8_premul);
}

#[test]
fn display_scale_maps_to_image_scale() {
    // Viewport at half resolution: an overlay at (25, 50) with scale 1 must match an overlay at
    // (50, 100) with scale 2 drawn on a full-size viewport.
    let base = BaseImage::solid(100, 200, WHITE).unwrap();

    let mut half = OverlayModel::new();
    half.add_overlay("HI", Point::new(25.0, 50.0)).unwrap();
    let half_out = render(&plan_for(&half, &base, Size::new(50.0, 100.0)), &base);

    let mut full = OverlayModel::new();
    let id = full.add_overlay("HI", Point::new(50.0, 100.0)).unwrap();
    full.update_scale(id, 2.0).unwrap();
    let full_out = render(&plan_for(&full, &base, Size::new(100.0, 200.0)), &base);

    assert_eq!(half_out, full_out);
    assert_eq!(half_out.pixel(40, 100), Some([0, 0, 0, 255]), "inside 'H'");
    assert_eq!(half_out.pixel(50, 100), Some(WHITE), "gap between glyphs");
    assert_eq!(half_out.pixel(60, 100), Some([0, 0, 0, 255]), "inside 'I'");
    assert_eq!(half_out.pixel(40, 80), Some(WHITE), "above the text");
}

#[test]
fn overlays_outside_the_image_are_clipped_without_error() {
    let base = BaseImage::solid(16, 16, WHITE).unwrap();
    let mut model = OverlayModel::new();
    model.add_overlay("far away", Point::new(-500.0, 900.0)).unwrap();
    let out = render(&plan_for(&model, &base, Size::new(16.0, 16.0)), &base);
    assert_eq!(out.data, *base.rgba8_premul);
}

#[test]
fn mismatched_plan_and_base_is_rejected() {
    let base = BaseImage::solid(8, 8, WHITE).unwrap();
    let other = BaseImage::solid(9, 8, WHITE).unwrap();
    let plan = plan_for(&OverlayModel::new(), &other, Size::new(9.0, 8.0));
    let err = CpuBackend::new(RenderSettings::default())
        .render_plan(&plan, &base, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, CollageError::InvalidArgument(_)));
}

#[test]
fn cancelled_token_aborts_render() {
    let base = BaseImage::solid(8, 8, WHITE).unwrap();
    let mut model = OverlayModel::new();
    model.add_overlay("x", Point::new(4.0, 4.0)).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();

    for m in [OverlayModel::new(), model] {
        let plan = plan_for(&m, &base, Size::new(8.0, 8.0));
        let err = CpuBackend::new(RenderSettings::default())
            .render_plan(&plan, &base, &cancel)
            .unwrap_err();
        assert!(matches!(err, CollageError::Cancelled));
    }
}

#[test]
fn oversized_surfaces_are_rejected() {
    assert!(surface_dims(70_000, 10).is_err());
    assert_eq!(surface_dims(4032, 3024).unwrap(), (4032, 3024));
}

fn fixture_settings() -> RenderSettings {
    RenderSettings {
        font: Some(crate::assets::font::load_font("tests/data/fonts/DejaVuSansMono.ttf").unwrap()),
    }
}

fn glyph_model(color: Rgba8) -> OverlayModel {
    let mut model = OverlayModel::new();
    model
        .add_overlay_with_color("W", Point::new(30.0, 15.0), color)
        .unwrap();
    model
}

fn inked_pixels(out: &FlattenedImage, x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<[u8; 4]> {
    let mut inked = Vec::new();
    for y in y0..y1 {
        for x in x0..x1 {
            if let Some(px) = out.pixel(x, y)
                && px != WHITE
            {
                inked.push(px);
            }
        }
    }
    inked
}

#[test]
fn glyphs_land_around_the_mapped_center() {
    // Display (30, 15) in a half-size viewport maps to image (60, 30) at 34px.
    let base = BaseImage::solid(120, 60, WHITE).unwrap();
    let plan = plan_for(&glyph_model(RED), &base, Size::new(60.0, 30.0));
    let out = CpuBackend::new(fixture_settings())
        .render_plan(&plan, &base, &CancelToken::new())
        .unwrap();

    let near = inked_pixels(&out, 45, 15, 75, 45);
    assert!(near.len() > 20, "only {} inked pixels", near.len());
    assert!(near.iter().any(|px| px[0] > 240 && px[1] < 60));
    assert!(near.iter().all(|px| px[1] == px[2] && px[0] >= px[1]));

    assert!(inked_pixels(&out, 0, 0, 30, 60).is_empty());
    assert!(inked_pixels(&out, 90, 0, 120, 60).is_empty());
}

#[test]
fn glyph_rendering_is_deterministic_and_differs_from_placeholders() {
    let base = BaseImage::solid(120, 60, WHITE).unwrap();
    let plan = plan_for(&glyph_model(BLUE), &base, Size::new(60.0, 30.0));

    let mut backend = CpuBackend::new(fixture_settings());
    let first = backend
        .render_plan(&plan, &base, &CancelToken::new())
        .unwrap();
    let second = CpuBackend::new(fixture_settings())
        .render_plan(&plan, &base, &CancelToken::new())
        .unwrap();
    let again = backend
        .render_plan(&plan, &base, &CancelToken::new())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first, again);

    assert_ne!(first, render(&plan, &base));
}
