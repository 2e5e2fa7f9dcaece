//! Continuous floating layout for gallery cards.
//!
//! Every tracked id drifts across the viewport at a constant-ish speed and
//! bounces off the edges. Positions are percentages of the viewport so the
//! panel can place cards at any window size. Initial state is derived from
//! the id and its index, so two layouts fed the same ordered ids agree.

use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::config::LayoutConfig;

// Offsets selecting independent pseudo-random values from one seed.
const OFFSET_LEFT: u32 = 0;
const OFFSET_TOP: u32 = 1;
const OFFSET_SPEED: u32 = 2;
const OFFSET_ANGLE: u32 = 3;
const OFFSET_SCALE: u32 = 4;
const OFFSET_BOUNCE: u32 = 16;

/// Card position as a percentage of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPosition {
    pub left: f32,
    pub top: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct ItemState {
    left: f32,
    top: f32,
    /// Percent per second
    vx: f32,
    vy: f32,
    scale: f32,
    seed: u32,
    bounces: u32,
}

impl ItemState {
    fn spawn(seed: u32, config: &LayoutConfig) -> Self {
        let speed = lerp(config.speed_min, config.speed_max, unit(seed, OFFSET_SPEED));
        let angle = unit(seed, OFFSET_ANGLE) * TAU;
        Self {
            left: lerp(config.spawn_min, config.spawn_max, unit(seed, OFFSET_LEFT)),
            top: lerp(config.spawn_min, config.spawn_max, unit(seed, OFFSET_TOP)),
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            scale: lerp(config.scale_min, config.scale_max, unit(seed, OFFSET_SCALE)),
            seed,
            bounces: 0,
        }
    }

    fn advance(&mut self, dt: f32, config: &LayoutConfig) {
        self.left += self.vx * dt;
        self.top += self.vy * dt;

        if let Some((position, velocity)) = reflect(self.left, self.vx, config) {
            self.left = position;
            self.vx = velocity * self.next_bounce_factor(config);
        }
        if let Some((position, velocity)) = reflect(self.top, self.vy, config) {
            self.top = position;
            self.vy = velocity * self.next_bounce_factor(config);
        }
        self.keep_speed_in_band(config);
    }

    fn next_bounce_factor(&mut self, config: &LayoutConfig) -> f32 {
        let t = unit(self.seed, OFFSET_BOUNCE.wrapping_add(self.bounces));
        self.bounces = self.bounces.wrapping_add(1);
        lerp(config.bounce_min, config.bounce_max, t)
    }

    fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }

    fn keep_speed_in_band(&mut self, config: &LayoutConfig) {
        let speed = self.speed();
        if !speed.is_finite() || speed <= f32::EPSILON {
            let angle = unit(self.seed, OFFSET_ANGLE) * TAU;
            self.vx = angle.cos() * config.speed_min;
            self.vy = angle.sin() * config.speed_min;
            return;
        }
        let target = speed.clamp(config.speed_min, config.speed_max);
        if target != speed {
            let factor = target / speed;
            self.vx *= factor;
            self.vy *= factor;
        }
    }
}

/// Clamp a coordinate that crossed a bound and point its velocity back inward.
fn reflect(position: f32, velocity: f32, config: &LayoutConfig) -> Option<(f32, f32)> {
    if position < config.bound_min {
        Some((config.bound_min, velocity.abs()))
    } else if position > config.bound_max {
        Some((config.bound_max, -velocity.abs()))
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct FloatingLayout {
    config: LayoutConfig,
    items: HashMap<String, ItemState>,
    /// Ids in the order last passed to `set_items`
    order: Vec<String>,
    last_tick: Option<f64>,
}

impl FloatingLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Track exactly `ids`: new ids get a fresh state, missing ones are dropped.
    pub fn set_items<S: AsRef<str>>(&mut self, ids: &[S]) {
        let order: Vec<String> = ids.iter().map(|id| id.as_ref().to_owned()).collect();

        self.items.retain(|id, _| order.contains(id));
        for (index, id) in order.iter().enumerate() {
            if !self.items.contains_key(id) {
                let state = ItemState::spawn(seed_for(id, index), &self.config);
                self.items.insert(id.clone(), state);
            }
        }
        if order.len() != self.order.len() {
            log::debug!("Floating layout now tracks {} items", order.len());
        }
        self.order = order;
        if self.order.is_empty() {
            self.last_tick = None;
        }
    }

    /// Advance the simulation to `now` (seconds). The first tick only records
    /// the time.
    pub fn tick(&mut self, now: f64) {
        let Some(last) = self.last_tick.replace(now) else {
            return;
        };
        let dt = now - last;
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.max_step_secs)
        } else {
            0.0
        };
        if dt <= 0.0 {
            return;
        }

        for state in self.items.values_mut() {
            state.advance(dt as f32, &self.config);
        }
    }

    /// Drop all tracked items and the tick clock.
    pub fn stop(&mut self) {
        self.items.clear();
        self.order.clear();
        self.last_tick = None;
    }

    pub fn is_running(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn position(&self, id: &str) -> Option<FloatPosition> {
        self.items.get(id).map(|state| FloatPosition {
            left: state.left,
            top: state.top,
        })
    }

    pub fn scale(&self, id: &str) -> Option<f32> {
        self.items.get(id).map(|state| state.scale)
    }

    /// Current speed in percent per second.
    pub fn speed(&self, id: &str) -> Option<f32> {
        self.items.get(id).map(ItemState::speed)
    }

    /// Positions in the order the ids were given.
    pub fn positions(&self) -> impl Iterator<Item = (&str, FloatPosition)> + '_ {
        self.order.iter().filter_map(|id| {
            self.position(id).map(|position| (id.as_str(), position))
        })
    }
}

/// Polynomial rolling hash of the id followed by its decimal index.
fn seed_for(id: &str, index: usize) -> u32 {
    id.chars()
        .chain(index.to_string().chars())
        .fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(c as u32))
}

/// Pseudo-random value in `[0, 1)`: one LCG step plus xor-shift mixing.
fn unit(seed: u32, offset: u32) -> f32 {
    let mut x = seed.wrapping_add(offset.wrapping_mul(0x9E37_79B9));
    x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    (x >> 8) as f32 / (1u32 << 24) as f32
}

fn lerp(min: f32, max: f32, t: f32) -> f32 {
    min + (max - min) * t
}
