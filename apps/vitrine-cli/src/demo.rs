use glam::Vec2;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use vitrine_assets::TextureLoader;
use vitrine_decor::{
    Animated, create_bouncing_sphere, create_lighting, create_spinning_sphere, create_walls,
};
use vitrine_input::{PointerEvent, RenderSurface};
use vitrine_refractor::RefractorText;
use vitrine_render::{DebugTextRenderer, Renderer};
use vitrine_scene::Scene;

use crate::config::SceneFile;

/// What happened during a headless demo run.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub frames: u32,
    pub walls: usize,
    pub hover_changes: u32,
    pub clicks: u32,
    pub scene_events: usize,
    pub distortion_installed: bool,
    pub render: String,
}

/// Build the full scene, run `frames` frames while sweeping a pointer
/// across the label's row, then tear the label down.
pub fn run(file: &SceneFile, loader: &dyn TextureLoader, frames: u32) -> anyhow::Result<DemoReport> {
    let _span = tracing::info_span!("demo", frames).entered();
    let scene = Rc::new(RefCell::new(Scene::new()));

    let walls = {
        let mut scene = scene.borrow_mut();
        let walls = match create_walls(&mut scene, loader, &file.walls) {
            Ok(walls) => walls,
            Err(e) => {
                tracing::error!("walls skipped: {e}");
                Vec::new()
            }
        };
        create_lighting(&mut scene, &file.lighting);
        walls
    };
    let animated: Vec<Box<dyn Animated>> = {
        let mut scene = scene.borrow_mut();
        let bouncing = create_bouncing_sphere(&mut scene, &file.bouncing_sphere);
        let spinning = create_spinning_sphere(&mut scene, &file.spinning_sphere);
        vec![
            Box::new(bouncing) as Box<dyn Animated>,
            Box::new(spinning) as Box<dyn Animated>,
        ]
    };

    let label = RefractorText::spawn(Rc::clone(&scene), file.label.clone(), loader)?;
    let rect = file.surface;
    let camera = Rc::new(RefCell::new(file.camera.with_aspect(rect.aspect())));
    let mut surface = RenderSurface::new(rect);

    let clicks = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&clicks);
    let handlers = label.setup_interaction(
        Rc::clone(&camera),
        &mut surface,
        Some(Box::new(move || {
            counter.set(counter.get() + 1);
            tracing::info!("label clicked");
        })),
    )?;

    let row = {
        let label_id = label.label().ok_or(vitrine_refractor::LabelError::NotReady)?;
        let world = scene
            .borrow()
            .world_position(label_id)
            .unwrap_or_default();
        let ndc = camera.borrow().project(world);
        rect.to_client(ndc.truncate()).y
    };

    let mut hover_changes = 0;
    let mut scene_events = 0;
    let mut hovering = label.is_hovering();
    for frame in 0..frames {
        let time = frame as f32 / 60.0;
        {
            let mut scene = scene.borrow_mut();
            for element in &animated {
                element.animate(&mut scene, time);
            }
        }
        label.animate(time)?;

        let progress = (frame as f32 + 0.5) / frames as f32;
        let pointer = Vec2::new(rect.left + rect.width * progress, row);
        surface.dispatch(&PointerEvent::Move {
            client_x: pointer.x,
            client_y: pointer.y,
        });
        surface.dispatch(&PointerEvent::Click {
            client_x: pointer.x,
            client_y: pointer.y,
        });
        if label.is_hovering() != hovering {
            hovering = label.is_hovering();
            hover_changes += 1;
            tracing::debug!(frame, hovering, cursor = ?surface.cursor(), "hover changed");
        }

        scene_events += scene.borrow_mut().drain_events().len();
    }

    let distortion_installed = label.poll_distortion()?.is_some();
    let render = DebugTextRenderer::new().render(&scene.borrow(), &camera.borrow());

    handlers.remove(&mut surface);
    label.dispose();
    scene_events += scene.borrow_mut().drain_events().len();

    Ok(DemoReport {
        frames,
        walls: walls.len(),
        hover_changes,
        clicks: clicks.get(),
        scene_events,
        distortion_installed,
        render,
    })
}
