use egui::{Context, PointerButton, Pos2, Rect, TouchId, TouchPhase};

use crate::document::CanvasSize;

/// Which kind of device produced a pointer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerDevice {
    Mouse,
    Touch {
        /// Reported contact radius, if the platform exposes one
        radius: Option<f32>,
        /// Number of simultaneous contacts, including this one
        contacts: usize,
    },
}

impl PointerDevice {
    pub fn is_touch(&self) -> bool {
        matches!(self, Self::Touch { .. })
    }
}

/// A pointer position in screen (client) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Pos2,
    pub pressure: Option<f32>,
    pub device: PointerDevice,
    /// Seconds on the caller's clock
    pub time: f64,
}

impl PointerSample {
    pub fn mouse(position: Pos2, time: f64) -> Self {
        Self {
            position,
            pressure: None,
            device: PointerDevice::Mouse,
            time,
        }
    }

    pub fn touch(position: Pos2, time: f64) -> Self {
        Self {
            position,
            pressure: None,
            device: PointerDevice::Touch {
                radius: None,
                contacts: 1,
            },
            time,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        if let PointerDevice::Touch { contacts, .. } = self.device {
            self.device = PointerDevice::Touch {
                radius: Some(radius),
                contacts,
            };
        }
        self
    }

    pub fn with_contacts(mut self, contacts: usize) -> Self {
        if let PointerDevice::Touch { radius, .. } = self.device {
            self.device = PointerDevice::Touch { radius, contacts };
        }
        self
    }
}

/// Raw capture events fed to the drawing session
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed or first finger down on the canvas
    PointerDown(PointerSample),
    /// Pointer moved while held
    PointerMove(PointerSample),
    /// Button or finger released
    PointerUp { device: PointerDevice, time: f64 },
    /// Pointer left the canvas or the gesture was cancelled
    PointerLeave { time: f64 },
}

/// Maps screen positions onto the canvas' logical coordinate space.
///
/// The canvas may be displayed at any on-screen size; logical coordinates are
/// always in `canvas_size` units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMapping {
    pub screen_rect: Rect,
    pub canvas_size: CanvasSize,
}

impl CanvasMapping {
    pub fn new(screen_rect: Rect, canvas_size: CanvasSize) -> Self {
        Self {
            screen_rect,
            canvas_size,
        }
    }

    /// Identity mapping: screen rect equals the canvas at the origin.
    pub fn identity(canvas_size: CanvasSize) -> Self {
        Self::new(
            Rect::from_min_size(Pos2::ZERO, canvas_size.to_vec2()),
            canvas_size,
        )
    }

    /// `logical = (client - rect.min) * (canvas_size / rect.size)`
    pub fn to_canvas(&self, client: Pos2) -> Pos2 {
        let rect = self.screen_rect;
        let scale_x = axis_scale(self.canvas_size.width, rect.width());
        let scale_y = axis_scale(self.canvas_size.height, rect.height());
        Pos2::new(
            (client.x - rect.min.x) * scale_x,
            (client.y - rect.min.y) * scale_y,
        )
    }

    pub fn contains(&self, client: Pos2) -> bool {
        self.screen_rect.contains(client)
    }
}

fn axis_scale(canvas_extent: f32, screen_extent: f32) -> f32 {
    if screen_extent > 0.0 && screen_extent.is_finite() {
        canvas_extent / screen_extent
    } else {
        1.0
    }
}

/// Handles converting raw egui input into our domain-specific InputEvents
#[derive(Debug, Default)]
pub struct InputHandler {
    mouse_down: bool,
    /// Active touch contacts in arrival order; the first is the primary one
    touches: Vec<TouchId>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process this frame's raw egui input and generate capture events.
    ///
    /// Only presses that start inside `canvas_rect` begin a gesture, and a held
    /// pointer that leaves the rect ends it.
    pub fn process_input(&mut self, ctx: &Context, canvas_rect: Rect) -> Vec<InputEvent> {
        ctx.input(|input| self.process_events(&input.raw.events, canvas_rect, input.time))
    }

    pub fn process_events(
        &mut self,
        raw_events: &[egui::Event],
        canvas_rect: Rect,
        time: f64,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();

        // Integrations synthesize mouse events from touches; skip those.
        let touch_frame = !self.touches.is_empty()
            || raw_events
                .iter()
                .any(|event| matches!(event, egui::Event::Touch { .. }));

        for event in raw_events {
            match event {
                egui::Event::Touch {
                    id,
                    phase,
                    pos,
                    force,
                    ..
                } => self.handle_touch(*id, *phase, *pos, *force, canvas_rect, time, &mut events),
                _ if touch_frame => {}
                egui::Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        if canvas_rect.contains(*pos) {
                            self.mouse_down = true;
                            events.push(InputEvent::PointerDown(PointerSample::mouse(*pos, time)));
                        }
                    } else if self.mouse_down {
                        self.mouse_down = false;
                        events.push(InputEvent::PointerUp {
                            device: PointerDevice::Mouse,
                            time,
                        });
                    }
                }
                egui::Event::PointerMoved(pos) if self.mouse_down => {
                    if canvas_rect.contains(*pos) {
                        events.push(InputEvent::PointerMove(PointerSample::mouse(*pos, time)));
                    } else {
                        self.mouse_down = false;
                        events.push(InputEvent::PointerLeave { time });
                    }
                }
                egui::Event::PointerGone if self.mouse_down => {
                    self.mouse_down = false;
                    events.push(InputEvent::PointerLeave { time });
                }
                _ => {}
            }
        }

        events
    }

    /// egui touch events carry no contact radius, so these samples leave it
    /// unset and palm rejection only applies to samples from integrations that
    /// report one through [`PointerSample::with_radius`].
    #[allow(clippy::too_many_arguments)]
    fn handle_touch(
        &mut self,
        id: TouchId,
        phase: TouchPhase,
        pos: Pos2,
        force: Option<f32>,
        canvas_rect: Rect,
        time: f64,
        events: &mut Vec<InputEvent>,
    ) {
        let is_primary = self.touches.first() == Some(&id);
        let sample = |contacts: usize| PointerSample {
            position: pos,
            pressure: force,
            device: PointerDevice::Touch {
                radius: None,
                contacts,
            },
            time,
        };

        match phase {
            TouchPhase::Start => {
                if !self.touches.contains(&id) {
                    self.touches.push(id);
                }
                if self.touches.len() == 1 && canvas_rect.contains(pos) {
                    events.push(InputEvent::PointerDown(sample(1)));
                }
            }
            TouchPhase::Move if is_primary => {
                events.push(InputEvent::PointerMove(sample(self.touches.len())));
            }
            TouchPhase::Move => {}
            TouchPhase::End | TouchPhase::Cancel => {
                self.touches.retain(|touch| *touch != id);
                if !is_primary {
                    return;
                }
                if phase == TouchPhase::End {
                    events.push(InputEvent::PointerUp {
                        device: PointerDevice::Touch {
                            radius: None,
                            contacts: 1,
                        },
                        time,
                    });
                } else {
                    events.push(InputEvent::PointerLeave { time });
                }
            }
        }
    }
}
