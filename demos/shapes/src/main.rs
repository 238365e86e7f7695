use std::rc::Rc;

use tessera::{
    Color, Primitive2D, ShaderProgram,
    app::{App, CameraMouseController},
    input::{Axis, Button, GameController, KeyboardController},
    math::{Vec2, vec2, vec3},
};

struct Shapes {
    ship: Primitive2D,
    wheel: Primitive2D,
    ring: Primitive2D,
    path: Primitive2D,
    pad: KeyboardController,
    camera: CameraMouseController,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    App::new(|setup| {
        let solid = Rc::new(ShaderProgram::default_program(setup.gpu)?);

        let mut ship = Primitive2D::quad(setup.gpu, solid.clone(), vec3(0.0, 0.0, 0.0), vec2(80.0, 40.0));
        ship.set_anchor_to_center();
        ship.set_color(Color::rgb(0.9, 0.6, 0.2));

        let mut wheel =
            Primitive2D::regular_polygon(setup.gpu, solid.clone(), vec3(-200.0, 0.0, 0.5), 60.0, 7, true)?;
        wheel.set_color(Color::BLUE);

        let mut ring =
            Primitive2D::regular_polygon(setup.gpu, solid.clone(), vec3(200.0, 0.0, 0.0), 60.0, 32, false)?;
        ring.set_color(Color::GREEN);

        let points = [vec2(0.0, 0.0), vec2(40.0, -60.0), vec2(80.0, 0.0), vec2(120.0, -60.0)];
        let mut path = Primitive2D::polyline(setup.gpu, solid, vec3(-60.0, 150.0, 0.0), &points, false)?;
        path.set_color(Color::WHITE);

        Ok(Shapes {
            ship,
            wheel,
            ring,
            path,
            pad: KeyboardController::default(),
            camera: CameraMouseController::default(),
        })
    })
    .title("Tessera Shapes")
    .screen_size(1024, 768)
    .centered(true)
    .clear_color(Color::rgb(0.1, 0.1, 0.12))
    .update(|s, f| {
        s.pad.update(f.input);
        s.camera.update_from_input(f.world.camera_mut(), f.input);

        let dir = vec2(s.pad.axis_value(Axis::LeftX), s.pad.axis_value(Axis::LeftY));
        let pos = s.ship.position().truncate() + dir * 300.0 * f.timer.delta;
        s.ship.set_position(pos.extend(0.0));
        if s.pad.button_pressed(Button::A) {
            s.ship.set_flip_x(!s.ship.flip_x());
        }

        s.wheel.set_angle(s.wheel.angle() + f.timer.delta);
        let pulse = 1.0 + 0.25 * (f.timer.frame as f32 * 0.05).sin();
        s.ring.set_scale(Vec2::splat(pulse));
    })
    .render(|s, f| {
        f.world.enqueue(&mut s.wheel);
        f.world.enqueue(&mut s.ring);
        f.world.enqueue(&mut s.path);
        f.world.enqueue(&mut s.ship);
    })
    .run()?;
    Ok(())
}
