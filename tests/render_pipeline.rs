use doodle_tank::{
    CanvasSize, DrawingSession, PointerDevice, PointerSample, Scene, ScoreReport,
    StrokeRenderer, Surface, Tool,
};
use egui::pos2;

fn stroke(session: &mut DrawingSession, points: &[(f32, f32)]) {
    let (x, y) = points[0];
    session.pointer_down(&PointerSample::mouse(pos2(x, y), 0.0));
    for &(x, y) in &points[1..] {
        session.pointer_move(&PointerSample::mouse(pos2(x, y), 0.1));
    }
    session.pointer_up(PointerDevice::Mouse, 0.2);
}

fn render(session: &DrawingSession, pixels_per_point: f32) -> Surface {
    let mut surface = Surface::new(session.canvas_size(), pixels_per_point).unwrap();
    StrokeRenderer::new().render(&session.scene(), &mut surface);
    surface
}

fn alpha(surface: &Surface, x: u32, y: u32) -> u8 {
    surface.pixel(x, y).unwrap()[3]
}

#[test]
fn test_curved_stroke_reaches_its_last_point() {
    let mut session = DrawingSession::default();
    session.set_width(4.0).unwrap();
    stroke(
        &mut session,
        &[(20.0, 200.0), (80.0, 40.0), (160.0, 180.0), (240.0, 60.0), (360.0, 120.0)],
    );

    let surface = render(&session, 1.0);
    assert!(surface.painted_pixels() > 0);
    assert!(alpha(&surface, 360, 120) > 200);
    assert!(alpha(&surface, 20, 200) > 200);
    assert_eq!(alpha(&surface, 390, 10), 0);
}

#[test]
fn test_in_progress_stroke_is_rendered() {
    let mut session = DrawingSession::default();
    session.set_width(6.0).unwrap();
    session.pointer_down(&PointerSample::mouse(pos2(10.0, 100.0), 0.0));
    session.pointer_move(&PointerSample::mouse(pos2(100.0, 100.0), 0.1));

    let surface = render(&session, 1.0);
    assert_eq!(alpha(&surface, 50, 100), 255);
}

#[test]
fn test_eraser_then_pen_through_the_session() {
    let mut session = DrawingSession::default();
    session.set_width(8.0).unwrap();
    stroke(&mut session, &[(50.0, 120.0), (350.0, 120.0)]);

    session.set_tool(Tool::Eraser);
    session.set_width(20.0).unwrap();
    stroke(&mut session, &[(150.0, 120.0), (250.0, 120.0)]);

    let erased = render(&session, 1.0);
    assert_eq!(alpha(&erased, 100, 120), 255);
    assert_eq!(alpha(&erased, 200, 120), 0);

    session.set_tool(Tool::Pen);
    session.set_color("#3366ff").unwrap();
    session.set_width(8.0).unwrap();
    stroke(&mut session, &[(200.0, 60.0), (200.0, 180.0)]);

    let repainted = render(&session, 1.0);
    assert_eq!(repainted.pixel(200, 120), Some([0x33, 0x66, 0xff, 255]));
    assert_eq!(alpha(&repainted, 170, 120), 0);
}

#[test]
fn test_undo_and_clear_repaint_from_scratch() {
    let mut session = DrawingSession::default();
    stroke(&mut session, &[(10.0, 10.0), (100.0, 100.0)]);
    let one = render(&session, 1.0);

    stroke(&mut session, &[(300.0, 10.0), (300.0, 200.0)]);
    session.undo();
    let undone = render(&session, 1.0);
    assert_eq!(one.pixmap().data(), undone.pixmap().data());

    session.clear();
    assert_eq!(render(&session, 1.0).painted_pixels(), 0);
}

#[test]
fn test_score_tint_fills_the_background() {
    let mut session = DrawingSession::default();
    session.set_score(Some(ScoreReport {
        score: 0.8,
        confidence: 0.9,
    }));

    let surface = render(&session, 1.0);
    let [r, g, b, a] = surface.pixel(5, 5).unwrap();
    assert!(a.abs_diff(61) <= 1, "alpha {a}");
    assert!(r.abs_diff(34) <= 3 && g.abs_diff(197) <= 3 && b.abs_diff(94) <= 3);
}

#[test]
fn test_png_export_matches_device_pixels() {
    let mut session = DrawingSession::default();
    stroke(&mut session, &[(10.0, 10.0), (390.0, 230.0)]);
    let surface = render(&session, 2.0);
    assert_eq!((surface.width(), surface.height()), (800, 480));

    let png = surface.encode_png().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (800, 480));
    assert_eq!(decoded.get_pixel(400, 240).0[3], 255);
    assert_eq!(decoded.get_pixel(700, 40).0[3], 0);
}

#[test]
fn test_render_ignores_empty_scene() {
    let mut surface = Surface::new(CanvasSize::default(), 1.0).unwrap();
    StrokeRenderer::new().render(&Scene::default(), &mut surface);
    assert_eq!(surface.painted_pixels(), 0);
}
