//! SDL2 presentation, input polling and frame timing.
//!
//! Only the binary touches this module; the engine renders into a plain
//! byte buffer that [`Window::present`] uploads to a streaming texture.

use log::debug;
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::camera::CameraInput;
use crate::colors::PixelFormat;
use crate::math::vec2::Vec2;

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

const TEXTURE_FORMAT: PixelFormatEnum = PixelFormatEnum::ARGB8888;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Quit,
    Resize(u32, u32),
    ToggleBoundingBoxes,
    ToggleDepthBuffer,
    ToggleRotation,
    ToggleNormalMapping,
    CycleShadingMode,
    SaveScreenshot,
}

/// Movement keys, look button and accumulated mouse motion.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputState {
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    look_held: bool,
    mouse_delta: Vec2,
}

impl InputState {
    fn set_key(&mut self, keycode: Keycode, pressed: bool) {
        match keycode {
            Keycode::W => self.forward = pressed,
            Keycode::S => self.back = pressed,
            Keycode::A => self.left = pressed,
            Keycode::D => self.right = pressed,
            _ => {}
        }
    }

    fn axis(positive: bool, negative: bool) -> f32 {
        match (positive, negative) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Input for this frame. Mouse motion is consumed; it only counts while
    /// the left button is held.
    pub fn take_camera_input(&mut self) -> CameraInput {
        let look_delta = std::mem::take(&mut self.mouse_delta);
        CameraInput {
            movement: Vec2::new(
                Self::axis(self.right, self.left),
                Self::axis(self.forward, self.back),
            ),
            look_delta,
        }
    }
}

/// Measures frame time and caps the frame rate.
pub struct FrameTimer {
    previous_frame_time: u64,
    fps_window_start: u64,
    frames_in_window: u32,
}

impl FrameTimer {
    pub fn new(window: &Window) -> Self {
        let now = window.timer().ticks64();
        Self {
            previous_frame_time: now,
            fps_window_start: now,
            frames_in_window: 0,
        }
    }

    /// Waits if necessary to maintain frame rate and returns the time since
    /// the previous call in seconds. Logs the frame rate once per second.
    pub fn tick(&mut self, window: &Window) -> f32 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < FRAME_TARGET_TIME as u64 {
            let time_to_wait = (FRAME_TARGET_TIME as u64) - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }
        self.previous_frame_time = current_time;

        self.frames_in_window += 1;
        let elapsed = current_time - self.fps_window_start;
        if elapsed >= 1000 {
            let fps = self.frames_in_window as f64 * 1000.0 / elapsed as f64;
            debug!("FPS: {fps:.1}");
            self.fps_window_start = current_time;
            self.frames_in_window = 0;
        }

        delta_time as f32 / 1000.0
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    // Field order matters: texture must drop before its creator
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    pixel_format: PixelFormat,
    input: InputState,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        let masks = TEXTURE_FORMAT.into_masks()?;
        let pixel_format =
            PixelFormat::from_masks(masks.rmask, masks.gmask, masks.bmask, masks.amask);

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // We ensure texture is dropped before texture_creator by struct field order.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(TEXTURE_FORMAT, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            timer_subsystem,
            pixel_format,
            input: InputState::default(),
            width,
            height,
        })
    }

    /// Drains the SDL event queue, updating input state and returning the
    /// discrete events in arrival order.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => events.push(WindowEvent::Quit),
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => events.push(WindowEvent::Resize(w as u32, h as u32)),
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat,
                    ..
                } => {
                    self.input.set_key(keycode, true);
                    if repeat {
                        continue;
                    }
                    let toggle = match keycode {
                        Keycode::F2 => Some(WindowEvent::ToggleBoundingBoxes),
                        Keycode::F4 => Some(WindowEvent::ToggleDepthBuffer),
                        Keycode::F5 => Some(WindowEvent::ToggleRotation),
                        Keycode::F6 => Some(WindowEvent::ToggleNormalMapping),
                        Keycode::F7 => Some(WindowEvent::CycleShadingMode),
                        Keycode::X => Some(WindowEvent::SaveScreenshot),
                        _ => None,
                    };
                    events.extend(toggle);
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => self.input.set_key(keycode, false),
                Event::MouseButtonDown {
                    mouse_btn: MouseButton::Left,
                    ..
                } => self.input.look_held = true,
                Event::MouseButtonUp {
                    mouse_btn: MouseButton::Left,
                    ..
                } => self.input.look_held = false,
                Event::MouseMotion { xrel, yrel, .. } if self.input.look_held => {
                    self.input.mouse_delta =
                        self.input.mouse_delta + Vec2::new(xrel as f32, yrel as f32);
                }
                _ => {}
            }
        }
        events
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.width = width;
        self.height = height;
        // SAFETY: Same as in new() - texture_creator outlives texture
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        self.texture = texture_creator_ref
            .create_texture_streaming(TEXTURE_FORMAT, width, height)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Channel layout of the streaming texture.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
