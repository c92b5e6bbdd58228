use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Error, Pixels, SurfaceTexture};
use tracing::warn;
use winit::window::Window;

use crate::app::{Entity, HudFrame, RenderableKind, SceneWorld};
use crate::sprite_keys::validate_sprite_key;

use super::text::{draw_hud_panel, Canvas, PanelLayout};
use super::{world_to_screen_px, Viewport, PLACEHOLDER_HALF_SIZE_PX};

const CLEAR_COLOR: [u8; 4] = [22, 26, 24, 255];
const PLACEHOLDER_OUTLINE_COLOR: [u8; 4] = [12, 14, 16, 255];

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    asset_root: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: HashSet<String>,
    draw_order: Vec<usize>,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            asset_root,
            sprite_cache: HashMap::new(),
            warned_missing_sprite_keys: HashSet::new(),
            draw_order: Vec::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let asset_root = self.asset_root.as_path();
        let sprite_cache = &mut self.sprite_cache;
        let warned = &mut self.warned_missing_sprite_keys;
        let draw_order = &mut self.draw_order;
        let frame = self.pixels.frame_mut();
        for chunk in frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&CLEAR_COLOR);
        }

        collect_draw_order(world.entities(), draw_order);
        let mut canvas = Canvas::new(frame, viewport.width, viewport.height);
        for &index in draw_order.iter() {
            let entity = &world.entities()[index];
            let (cx, cy) = world_to_screen_px(entity.transform.position, world.camera(), viewport);
            let sprite = match &entity.renderable.kind {
                RenderableKind::Sprite(key) => {
                    resolve_cached_sprite(sprite_cache, warned, asset_root, key)
                }
                RenderableKind::Placeholder => None,
            };
            match sprite {
                Some(sprite) => draw_sprite_centered(&mut canvas, cx, cy, sprite),
                None => draw_placeholder(&mut canvas, cx, cy, entity.renderable.tint),
            }
        }

        draw_hud(&mut canvas, world.hud());
        self.pixels.render()
    }
}

/// Visible entities, lower on screen drawn last; ties keep spawn order.
fn collect_draw_order(entities: &[Entity], out: &mut Vec<usize>) {
    out.clear();
    out.extend(
        entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| entity.visible)
            .map(|(index, _)| index),
    );
    out.sort_by(|a, b| {
        let ea = &entities[*a];
        let eb = &entities[*b];
        eb.transform
            .position
            .y
            .total_cmp(&ea.transform.position.y)
            .then(ea.applied_spawn_order().cmp(&eb.applied_spawn_order()))
    });
}

fn draw_hud(canvas: &mut Canvas<'_>, hud: &HudFrame) {
    if hud.screen_fade() > 0.0 {
        canvas.fade_to_black(hud.screen_fade());
    }
    let mut layout = PanelLayout::default();
    let screen = canvas.size();
    for panel in hud.panels() {
        let rect = layout.place(panel, screen);
        draw_hud_panel(canvas, panel, rect);
    }
}

fn draw_placeholder(canvas: &mut Canvas<'_>, cx: i32, cy: i32, tint: [u8; 4]) {
    let half = PLACEHOLDER_HALF_SIZE_PX;
    canvas.fill_rect(cx - half, cy - half, half * 2 + 1, half * 2 + 1, tint, 1.0);
    canvas.rect_outline(
        cx - half,
        cy - half,
        half * 2 + 1,
        half * 2 + 1,
        PLACEHOLDER_OUTLINE_COLOR,
        1.0,
    );
}

fn draw_sprite_centered(canvas: &mut Canvas<'_>, cx: i32, cy: i32, sprite: &LoadedSprite) {
    let expected_len = sprite.width as usize * sprite.height as usize * 4;
    if sprite.width == 0 || sprite.height == 0 || sprite.rgba.len() < expected_len {
        return;
    }
    let left = cx - sprite.width as i32 / 2;
    let top = cy - sprite.height as i32 / 2;
    for (index, pixel) in sprite.rgba.chunks_exact(4).enumerate() {
        if pixel[3] == 0 {
            continue;
        }
        let x = left + (index as u32 % sprite.width) as i32;
        let y = top + (index as u32 / sprite.width) as i32;
        canvas.blend_pixel(x, y, [pixel[0], pixel[1], pixel[2], pixel[3]], 1.0);
    }
}

fn resolve_cached_sprite<'a>(
    cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    warned_missing_sprite_keys: &mut HashSet<String>,
    asset_root: &Path,
    key: &str,
) -> Option<&'a LoadedSprite> {
    if !cache.contains_key(key) {
        let sprite = match resolve_sprite_image_path(asset_root, key) {
            Ok(path) => match load_sprite_rgba(&path) {
                Ok(sprite) => Some(sprite),
                Err(reason) => {
                    warn_sprite_load_once(warned_missing_sprite_keys, key, Some(&path), &reason);
                    None
                }
            },
            Err(reason) => {
                warn_sprite_load_once(warned_missing_sprite_keys, key, None, &reason);
                None
            }
        };
        cache.insert(key.to_string(), sprite);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn resolve_sprite_image_path(asset_root: &Path, key: &str) -> Result<PathBuf, String> {
    validate_sprite_key(key).map_err(|error| format!("invalid_key:{error}"))?;
    Ok(asset_root
        .join("base")
        .join("sprites")
        .join(format!("{key}.png")))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason,
        "renderer_sprite_load_failed_using_placeholder"
    );
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::app::{RenderableDesc, Transform, Vec2};

    fn placeholder() -> RenderableDesc {
        RenderableDesc {
            kind: RenderableKind::Placeholder,
            debug_name: "test",
            tint: [255, 0, 0, 255],
        }
    }

    #[test]
    fn draw_order_puts_lower_entities_last_and_skips_hidden() {
        let mut world = SceneWorld::default();
        let high = world.spawn(
            Transform {
                position: Vec2::new(0.0, 3.0),
            },
            placeholder(),
        );
        let low = world.spawn(
            Transform {
                position: Vec2::new(0.0, -3.0),
            },
            placeholder(),
        );
        let hidden = world.spawn(Transform::default(), placeholder());
        world.apply_pending();
        if let Some(entity) = world.find_entity_mut(hidden) {
            entity.visible = false;
        }

        let mut order = Vec::new();
        collect_draw_order(world.entities(), &mut order);
        let ids: Vec<_> = order.iter().map(|i| world.entities()[*i].id).collect();
        assert_eq!(ids, vec![high, low]);
    }

    #[test]
    fn missing_sprite_is_cached_as_none_and_warned_once() {
        let temp = TempDir::new().expect("tempdir");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        assert!(resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "props/can").is_none());
        assert!(resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "props/can").is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(warned.len(), 1);
    }

    #[test]
    fn invalid_sprite_key_never_touches_disk() {
        let temp = TempDir::new().expect("tempdir");
        let error = resolve_sprite_image_path(temp.path(), "../escape").expect_err("invalid");
        assert!(error.starts_with("invalid_key:"));
    }

    #[test]
    fn sprite_png_loads_from_base_sprites_dir() {
        let temp = TempDir::new().expect("tempdir");
        let sprite_dir = temp.path().join("base").join("sprites");
        std::fs::create_dir_all(&sprite_dir).expect("dirs");
        let image = image::RgbaImage::from_pixel(2, 3, image::Rgba([1, 2, 3, 255]));
        image.save(sprite_dir.join("horn.png")).expect("save png");

        let mut cache = HashMap::new();
        let mut warned = HashSet::new();
        let sprite =
            resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "horn").expect("sprite");
        assert_eq!((sprite.width, sprite.height), (2, 3));
        assert!(warned.is_empty());
    }
}
