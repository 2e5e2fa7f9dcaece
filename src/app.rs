use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use egui::{Rect, TextureHandle, TextureId, TextureOptions};
use futures::executor::block_on;

use crate::config::Config;
use crate::gallery::{GalleryId, GalleryItem, GalleryStore, ListQuery, MemoryGallery, VoteDirection};
use crate::input::InputHandler;
use crate::layout::{FloatPosition, FloatingLayout};
use crate::panels;
use crate::renderer::StrokeRenderer;
use crate::scoring::{RandomScorer, Scorer};
use crate::session::DrawingSession;
use crate::stroke::{BrushSettings, StrokeColor, Tool};
use crate::submit::submit_drawing;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub enum View {
    #[default]
    Draw,
    Tank,
}

/// A gallery card as the tank panel places it this frame.
#[derive(Debug, Clone)]
pub struct Card {
    pub item: GalleryItem,
    pub position: FloatPosition,
    pub scale: f32,
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct DoodleApp {
    config: Config,
    brush: BrushSettings,
    view: View,
    list_query: ListQuery,

    #[serde(skip)]
    session: DrawingSession,
    #[serde(skip)]
    input: InputHandler,
    #[serde(skip)]
    renderer: StrokeRenderer,
    #[serde(skip)]
    surface: Option<Surface>,
    #[serde(skip)]
    canvas_texture: Option<TextureHandle>,
    #[serde(skip)]
    canvas_dirty: bool,
    #[serde(skip)]
    scorer: RandomScorer,

    #[serde(skip)]
    gallery: Arc<MemoryGallery>,
    #[serde(skip)]
    items: Vec<GalleryItem>,
    /// Decoded thumbnails; `None` marks images that failed to decode
    #[serde(skip)]
    thumbnails: HashMap<GalleryId, Option<TextureHandle>>,
    #[serde(skip)]
    voted: HashSet<GalleryId>,
    #[serde(skip)]
    layout: FloatingLayout,

    #[serde(skip)]
    status: Option<String>,
}

impl Default for DoodleApp {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}

impl DoodleApp {
    /// Called once before the first frame.
    ///
    /// A config loaded from the environment replaces the persisted one.
    pub fn new(cc: &eframe::CreationContext<'_>, env_config: Option<Config>) -> Self {
        let restored: Option<Self> = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY));

        match restored {
            Some(mut app) => {
                log::info!("Restored app state");
                if let Some(config) = env_config {
                    app.config = config;
                }
                app.reset_session();
                app
            }
            None => Self::with_config(env_config.unwrap_or_default()),
        }
    }

    pub fn with_config(config: Config) -> Self {
        let mut app = Self {
            brush: config.canvas.brush,
            config,
            view: View::Draw,
            list_query: ListQuery::default(),
            session: DrawingSession::default(),
            input: InputHandler::new(),
            renderer: StrokeRenderer::new(),
            surface: None,
            canvas_texture: None,
            canvas_dirty: true,
            scorer: RandomScorer::new(),
            gallery: Arc::new(MemoryGallery::new()),
            items: Vec::new(),
            thumbnails: HashMap::new(),
            voted: HashSet::new(),
            layout: FloatingLayout::default(),
            status: None,
        };
        app.reset_session();
        app
    }

    /// Rebuild the skipped runtime state from the persisted settings.
    fn reset_session(&mut self) {
        self.session = DrawingSession::new(
            self.config.canvas.size,
            self.brush,
            self.config.capture.clone(),
        );
        self.sync_brush();
        self.layout = FloatingLayout::new(self.config.layout.clone());
        self.input = InputHandler::new();
        self.canvas_dirty = true;
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn list_query(&self) -> ListQuery {
        self.list_query
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn has_voted(&self, id: &GalleryId) -> bool {
        self.voted.contains(id)
    }

    pub fn set_view(&mut self, view: View, now: f64) {
        if view == self.view {
            return;
        }
        log::info!("Switching to {view:?} view");
        match view {
            View::Draw => self.layout.stop(),
            View::Tank => {
                // A gesture cannot continue across views.
                if self.session.pointer_leave(now) {
                    self.rescore(now);
                }
                self.input = InputHandler::new();
                self.canvas_dirty = true;
                self.refresh_gallery();
            }
        }
        self.view = view;
    }

    // Drawing

    pub fn set_tool(&mut self, tool: Tool) {
        self.session.set_tool(tool);
        self.sync_brush();
    }

    pub fn set_color(&mut self, color: StrokeColor) {
        self.session.set_stroke_color(color);
        self.sync_brush();
    }

    pub fn set_width(&mut self, width: f32) {
        if let Err(err) = self.session.set_width(width) {
            log::warn!("{err}");
            self.status = Some(err.to_string());
        }
        self.sync_brush();
    }

    fn sync_brush(&mut self) {
        self.brush = *self.session.brush();
    }

    /// Feed this frame's pointer input on `canvas_rect` to the session.
    pub fn handle_canvas_input(&mut self, ctx: &egui::Context, canvas_rect: Rect, now: f64) {
        self.session.set_canvas_rect(canvas_rect);
        let events = self.input.process_input(ctx, canvas_rect);
        if events.is_empty() {
            return;
        }

        let committed = self.session.strokes().len();
        for event in &events {
            self.session.handle_event(event);
        }
        if self.session.strokes().len() != committed {
            self.rescore(now);
        }
        self.canvas_dirty = true;
    }

    fn rescore(&mut self, now: f64) {
        let score = self.scorer.score(&self.session.drawing_document(now));
        if let Some(report) = score {
            log::debug!("Drawing scored {:.2} ({:.2} confidence)", report.score, report.confidence);
        }
        self.session.set_score(score);
    }

    pub fn undo(&mut self, now: f64) {
        if self.session.undo().is_some() {
            self.rescore(now);
            self.canvas_dirty = true;
        }
    }

    pub fn clear(&mut self) {
        self.session.clear();
        self.status = None;
        self.canvas_dirty = true;
    }

    pub fn submit(&mut self, now: f64) {
        let result = block_on(submit_drawing(
            &mut self.session,
            &self.renderer,
            self.gallery.as_ref(),
            now,
        ));
        self.status = Some(match result {
            Ok(_) => {
                self.canvas_dirty = true;
                "Drawing submitted to the tank".to_owned()
            }
            Err(err) => err.to_string(),
        });
    }

    /// Texture showing the current drawing, re-rendered when it changed.
    pub fn canvas_texture(&mut self, ctx: &egui::Context) -> Option<TextureId> {
        let pixels_per_point = ctx.pixels_per_point();
        let canvas_size = self.session.canvas_size();

        let stale = !self
            .surface
            .as_ref()
            .is_some_and(|surface| surface.matches(canvas_size, pixels_per_point));
        if stale {
            self.surface = match Surface::new(canvas_size, pixels_per_point) {
                Ok(surface) => Some(surface),
                Err(err) => {
                    log::error!("Skipping canvas rendering: {err}");
                    None
                }
            };
            self.canvas_dirty = true;
        }
        let surface = self.surface.as_mut()?;

        if self.canvas_dirty || self.canvas_texture.is_none() {
            self.renderer.render(&self.session.scene(), surface);
            let image = surface.to_color_image();
            if let Some(texture) = self.canvas_texture.as_mut() {
                texture.set(image, TextureOptions::LINEAR);
            } else {
                self.canvas_texture =
                    Some(ctx.load_texture("drawing-canvas", image, TextureOptions::LINEAR));
            }
            self.canvas_dirty = false;
        }
        self.canvas_texture.as_ref().map(TextureHandle::id)
    }

    // Tank

    pub fn set_list_query(&mut self, query: ListQuery) {
        if query != self.list_query {
            self.list_query = query;
            self.refresh_gallery();
        }
    }

    pub fn refresh_gallery(&mut self) {
        match block_on(self.gallery.list(self.list_query)) {
            Ok(items) => {
                let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
                self.layout.set_items(&ids);
                self.thumbnails
                    .retain(|id, _| items.iter().any(|item| item.id == *id));
                self.items = items;
            }
            Err(err) => {
                log::error!("Failed to load gallery: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn vote(&mut self, id: &GalleryId, direction: VoteDirection) {
        if self.voted.contains(id) {
            self.status = Some("You already voted on this drawing".to_owned());
            return;
        }
        match block_on(self.gallery.vote(id, direction)) {
            Ok(()) => {
                self.voted.insert(id.clone());
                self.refresh_gallery();
            }
            Err(err) => {
                log::warn!("Vote failed: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    pub fn delete(&mut self, id: &GalleryId) {
        match block_on(self.gallery.delete(id)) {
            Ok(()) => self.refresh_gallery(),
            Err(err) => {
                log::warn!("Delete failed: {err}");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Advance the floating layout and return the cards to draw.
    pub fn tick_cards(&mut self, now: f64) -> Vec<Card> {
        self.layout.tick(now);
        self.items
            .iter()
            .filter_map(|item| {
                Some(Card {
                    item: item.clone(),
                    position: self.layout.position(item.id.as_str())?,
                    scale: self.layout.scale(item.id.as_str())?,
                })
            })
            .collect()
    }

    pub fn is_tank_animating(&self) -> bool {
        self.layout.is_running()
    }

    pub fn thumbnail(&mut self, ctx: &egui::Context, item: &GalleryItem) -> Option<TextureId> {
        let entry = self.thumbnails.entry(item.id.clone()).or_insert_with(|| {
            match image::load_from_memory(&item.image_png) {
                Ok(decoded) => {
                    let decoded = decoded.to_rgba8();
                    let size = [decoded.width() as usize, decoded.height() as usize];
                    let image = egui::ColorImage::from_rgba_unmultiplied(size, decoded.as_raw());
                    Some(ctx.load_texture(
                        format!("drawing-{}", item.id),
                        image,
                        TextureOptions::LINEAR,
                    ))
                }
                Err(err) => {
                    log::warn!("Cannot decode drawing {}: {err}", item.id);
                    None
                }
            }
        });
        entry.as_ref().map(TextureHandle::id)
    }
}

impl eframe::App for DoodleApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);

        panels::nav_panel(self, ctx, now);
        match self.view {
            View::Draw => {
                panels::tools_panel(self, ctx, now);
                panels::central_panel(self, ctx, now);
            }
            View::Tank => panels::tank_panel(self, ctx, now),
        }
    }
}
