use std::error::Error;

use clap::Parser;
use log::info;

use rustshade::config::Config;
use rustshade::engine::Engine;
use rustshade::window::{FrameTimer, Window, WindowEvent};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let config = Config::parse();

    let mut window = Window::new("Rustshade", config.width, config.height)?;
    let mut engine = Engine::new(
        config.width,
        config.height,
        window.pixel_format(),
        config.camera(),
    );
    engine.set_output_path(config.output.clone());
    engine.load_scene(&config.scene())?;

    info!("Controls: WASD move, hold LMB to look, F2 bounding boxes, F4 depth buffer,");
    info!("F5 rotation, F6 normal mapping, F7 shading mode, X screenshot, Esc quit");

    let mut timer = FrameTimer::new(&window);

    'running: loop {
        for event in window.poll_events() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::Resize(w, h) => {
                    window.resize(w, h)?;
                    engine.resize(w, h);
                }
                WindowEvent::ToggleBoundingBoxes => engine.toggle_bounding_boxes(),
                WindowEvent::ToggleDepthBuffer => engine.toggle_depth_buffer(),
                WindowEvent::ToggleRotation => engine.toggle_rotation(),
                WindowEvent::ToggleNormalMapping => engine.toggle_normal_mapping(),
                WindowEvent::CycleShadingMode => engine.cycle_shading_mode(),
                WindowEvent::SaveScreenshot => {
                    engine.save_buffer_to_image();
                }
            }
        }

        let delta_time = timer.tick(&window);
        let input = window.input_mut().take_camera_input();
        engine.update(&input, delta_time);
        engine.render();
        window.present(engine.frame_buffer())?;
    }

    Ok(())
}
