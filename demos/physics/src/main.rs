use std::rc::Rc;

use tessera::{
    Color, ShaderProgram,
    app::{App, CameraMouseController},
    input::KeyCode,
    physics::{DebugDraw, PhysicsScene},
};

const PIXELS_PER_METER: f32 = 32.0;

/// A small R.U.B.E. export: ground chain, a hinge with a paddle & some falling shapes
const SCENE: &str = r#"{
    "gravity": { "x": 0, "y": -10 },
    "allowSleep": true,
    "stepsPerSecond": 60,
    "positionIterations": 3,
    "velocityIterations": 8,
    "body": [
        {
            "name": "ground",
            "type": 0,
            "position": 0,
            "fixture": [{
                "name": "floor",
                "friction": 0.6,
                "chain": { "vertices": { "x": [-14, -14, 14, 14], "y": [12, -8, -8, 12] } }
            }]
        },
        {
            "name": "paddle",
            "type": 2,
            "position": { "x": 0, "y": -2 },
            "fixture": [{
                "density": 1,
                "polygon": { "vertices": { "x": [-4, 4, 4, -4], "y": [-0.25, -0.25, 0.25, 0.25] } }
            }]
        },
        {
            "name": "ball",
            "type": 2,
            "position": { "x": -2, "y": 6 },
            "fixture": [{ "density": 1, "restitution": 0.5, "circle": { "center": 0, "radius": 0.8 } }]
        },
        {
            "name": "crate",
            "type": 2,
            "angle": 0.4,
            "position": { "x": 2.5, "y": 8 },
            "fixture": [{
                "density": 2,
                "polygon": { "vertices": { "x": [-0.7, 0.7, 0.7, -0.7], "y": [-0.7, -0.7, 0.7, 0.7] } }
            }]
        },
        {
            "name": "sensor",
            "type": 0,
            "position": { "x": 0, "y": -7 },
            "fixture": [{ "sensor": true, "circle": { "center": 0, "radius": 0.5 } }]
        }
    ],
    "joint": [
        {
            "name": "hinge",
            "type": "revolute",
            "bodyA": 0,
            "bodyB": 1,
            "anchorA": { "x": 0, "y": -2 },
            "anchorB": 0,
            "enableMotor": true,
            "motorSpeed": 0.5,
            "maxMotorTorque": 500
        }
    ]
}"#;

struct Demo {
    scene: PhysicsScene,
    debug: DebugDraw,
    camera: CameraMouseController,
    paused: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    App::new(|setup| {
        let scene = match std::env::args().nth(1) {
            Some(path) => PhysicsScene::from_file(path)?,
            None => PhysicsScene::from_json(SCENE)?,
        };
        let program = Rc::new(ShaderProgram::default_program(setup.gpu)?);
        let debug = DebugDraw::new(setup.gpu, program, &scene, PIXELS_PER_METER)?;

        // physics is y-up
        setup.world.camera_mut().set_flip_vertical(true);

        Ok(Demo {
            scene,
            debug,
            camera: CameraMouseController::default(),
            paused: false,
        })
    })
    .title("Tessera Physics")
    .screen_size(1024, 768)
    .centered(true)
    .clear_color(Color::rgb(0.05, 0.05, 0.08))
    .update(|d, f| {
        if f.input.key_pressed(KeyCode::Space) {
            d.paused = !d.paused;
        }
        if f.input.key_pressed(KeyCode::KeyS) {
            d.scene.step();
        }
        d.camera.update_from_input(f.world.camera_mut(), f.input);

        if !d.paused {
            d.scene.update(f.timer.delta);
        }
        d.debug.update(&d.scene);
    })
    .render(|d, f| d.debug.enqueue(f.world))
    .run()?;
    Ok(())
}
