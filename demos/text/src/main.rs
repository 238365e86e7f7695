use tessera::{
    Color,
    app::App,
    math::{vec2, vec3},
    text::{Font, Text},
};

const DEFAULT_FONT: &str = "assets/fonts/roboto-mono-regular.fnt";

struct Demo {
    title: Text,
    clock: Text,
    elapsed: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fnt = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_FONT.to_string());
    let fps_fnt = fnt.clone();

    App::new(move |setup| {
        let font = Font::from_file(setup.gpu, &fnt)?;
        let title = Text::new(
            setup.gpu,
            &font,
            "Tessera\nbitmap text, kerned: AVA Wo",
            vec3(40.0, 80.0, 0.0),
            vec2(48.0, 48.0),
            Color::WHITE,
        );
        let clock = Text::new(setup.gpu, &font, "0.0", vec3(40.0, 220.0, 0.0), vec2(32.0, 32.0), Color::GREEN);
        Ok(Demo {
            title,
            clock,
            elapsed: 0.0,
        })
    })
    .title("Tessera Text")
    .fps_font(fps_fnt)
    .update(|d, f| {
        d.elapsed += f.timer.delta;
        d.clock.set_text(f.gpu, &format!("{:.1}", d.elapsed));
    })
    .render(|d, f| {
        f.ui.enqueue(&mut d.title);
        f.ui.enqueue(&mut d.clock);
    })
    .run()?;
    Ok(())
}
