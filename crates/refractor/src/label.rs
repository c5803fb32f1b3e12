use glam::Vec2;
use std::cell::RefCell;
use std::rc::Rc;
use vitrine_assets::{LoadStatus, PendingTexture, TextureLoader};
use vitrine_common::{Color, NodeId};
use vitrine_input::{CursorStyle, ListenerId, PointerEventKind, RenderSurface, SurfaceState};
use vitrine_scene::{
    BasicMaterial, ColorSpace, Geometry, GeometryId, Material, MaterialId, Node, PerspectiveCamera,
    RefractionMaterial, RefractionUniforms, Scene, SceneError, Texture, TextureId,
};

use crate::config::RefractiveLabelConfig;
use crate::text::TextRasterizer;
use crate::LabelError;

/// Scene shared between the label, its pointer handlers and the host.
pub type SceneRef = Rc<RefCell<Scene>>;
/// Camera shared with the pointer handlers so they see later moves.
pub type CameraRef = Rc<RefCell<PerspectiveCamera>>;

/// Label tint while the pointer is over it.
pub const HOVER_COLOR: Color = Color::from_hex(0xb02f72);
pub const LABEL_ANISOTROPY: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    Uninitialized,
    Ready,
    Disposed,
}

/// Listener ids returned by [`RefractorText::setup_interaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionHandlers {
    pub on_move: ListenerId,
    pub on_click: ListenerId,
}

impl InteractionHandlers {
    /// Deregister both handlers. Returns true if both were still registered.
    pub fn remove(&self, surface: &mut RenderSurface) -> bool {
        let moved = surface.remove_listener(self.on_move);
        let clicked = surface.remove_listener(self.on_click);
        moved && clicked
    }
}

#[derive(Debug, Clone, Copy)]
struct Surfaces {
    refractor: NodeId,
    refractor_geometry: GeometryId,
    refractor_material: MaterialId,
    label: NodeId,
    label_geometry: GeometryId,
    label_material: MaterialId,
    label_texture: TextureId,
    distortion: Option<TextureId>,
}

#[derive(Debug)]
struct LabelInner {
    state: LabelState,
    text: String,
    surfaces: Option<Surfaces>,
    /// Last pointer position in normalized device coordinates.
    pointer: Vec2,
    hovering: bool,
    pending_distortion: Option<PendingTexture>,
    rasterizer: TextRasterizer,
}

impl LabelInner {
    fn ready(&self) -> Result<Surfaces, LabelError> {
        match (self.state, self.surfaces) {
            (LabelState::Ready, Some(surfaces)) => Ok(surfaces),
            (LabelState::Disposed, _) => Err(LabelError::Disposed),
            _ => Err(LabelError::NotReady),
        }
    }

    fn label_hit(&self, scene: &Scene, camera: &PerspectiveCamera) -> bool {
        let Ok(surfaces) = self.ready() else {
            return false;
        };
        let ray = camera.ray_through(self.pointer);
        !scene.intersect_object(&ray, surfaces.label, true).is_empty()
    }

    /// Install the distortion map if its load has finished.
    fn poll_distortion(&mut self, scene: &mut Scene) -> Result<(), LabelError> {
        let mut surfaces = self.ready()?;
        let Some(pending) = self.pending_distortion.as_mut() else {
            return Ok(());
        };
        match pending.poll() {
            LoadStatus::Pending => return Ok(()),
            LoadStatus::Ready(image) => {
                let texture = scene.add_texture(Texture::tiled(image, 1.0));
                let material = scene.mesh_material_mut(surfaces.refractor)?;
                if let Some(refraction) = material.as_refraction_mut() {
                    refraction.uniforms.distortion = Some(texture);
                }
                surfaces.distortion = Some(texture);
                self.surfaces = Some(surfaces);
                tracing::debug!(path = %pending.path().display(), "distortion map installed");
            }
            LoadStatus::Failed(err) => {
                tracing::warn!(path = %pending.path().display(), "could not load texture: {err}");
            }
            LoadStatus::Cancelled => {}
        }
        self.pending_distortion = None;
        Ok(())
    }
}

fn label_raster_texture(raster: image::RgbaImage) -> Texture {
    Texture::new(raster)
        .with_color_space(ColorSpace::Srgb)
        .with_anisotropy(LABEL_ANISOTROPY)
}

fn install_label_map(
    scene: &mut Scene,
    surfaces: Surfaces,
    texture: TextureId,
) -> Result<(), LabelError> {
    let material = scene
        .mesh_material_mut(surfaces.label)?
        .as_basic_mut()
        .ok_or(SceneError::MaterialNotFound(surfaces.label_material))?;
    material.map = Some(texture);
    material.mark_needs_update();
    Ok(())
}

fn set_tint(scene: &mut Scene, label: NodeId, color: Color, opacity: Option<f32>) {
    match scene.mesh_material_mut(label).map(Material::as_basic_mut) {
        Ok(Some(material)) => {
            material.color = color;
            if let Some(opacity) = opacity {
                material.opacity = opacity;
            }
        }
        Ok(None) => tracing::warn!(node = %label.short(), "label material is not basic"),
        Err(e) => tracing::warn!("cannot tint label: {e}"),
    }
}

/// A refractive plane with a clickable text label parented under it.
///
/// The label owns its nodes and resources in the shared scene from
/// [`init`](Self::init) until [`dispose`](Self::dispose). Pointer handlers
/// installed by [`setup_interaction`](Self::setup_interaction) share its
/// state, so they stop reacting once the label is disposed.
pub struct RefractorText {
    scene: SceneRef,
    config: RefractiveLabelConfig,
    inner: Rc<RefCell<LabelInner>>,
}

impl std::fmt::Debug for RefractorText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RefractorText")
            .field("state", &inner.state)
            .field("text", &inner.text)
            .field("hovering", &inner.hovering)
            .finish()
    }
}

impl RefractorText {
    /// An uninitialized label. Nothing is added to the scene until `init`.
    pub fn new(scene: SceneRef, config: RefractiveLabelConfig) -> Self {
        let rasterizer = TextRasterizer::load(config.font_path.as_deref());
        let inner = LabelInner {
            state: LabelState::Uninitialized,
            text: config.text.clone(),
            surfaces: None,
            pointer: Vec2::ONE,
            hovering: false,
            pending_distortion: None,
            rasterizer,
        };
        Self {
            scene,
            config,
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Construct and initialize in one step.
    pub fn spawn(
        scene: SceneRef,
        config: RefractiveLabelConfig,
        loader: &dyn TextureLoader,
    ) -> Result<Self, LabelError> {
        let label = Self::new(scene, config);
        label.init(loader)?;
        Ok(label)
    }

    /// Build both surfaces, add the refractor to the scene and start the
    /// distortion-map load. The map is installed by a later
    /// [`animate`](Self::animate) or [`poll_distortion`](Self::poll_distortion).
    pub fn init(&self, loader: &dyn TextureLoader) -> Result<(), LabelError> {
        let mut inner = self.inner.borrow_mut();
        match inner.state {
            LabelState::Ready => return Ok(()),
            LabelState::Disposed => return Err(LabelError::Disposed),
            LabelState::Uninitialized => {}
        }
        let _span = tracing::debug_span!("refractor_init", text = %inner.text).entered();
        let config = &self.config;
        let mut scene = self.scene.borrow_mut();

        let raster = inner.rasterizer.rasterize(&inner.text);
        let label_texture = scene.add_texture(label_raster_texture(raster));
        let label_geometry = scene.add_geometry(Geometry::plane(
            config.text_size.width,
            config.text_size.height,
        ));
        let label_material = scene.add_material(Material::Basic(BasicMaterial {
            map: Some(label_texture),
            transparent: true,
            ..BasicMaterial::default()
        }));

        let refractor_geometry = scene.add_geometry(Geometry::plane(
            config.refractor_size.width,
            config.refractor_size.height,
        ));
        let refractor_material = scene.add_material(Material::Refraction(RefractionMaterial {
            color: config.color,
            texture_width: config.texture_width,
            texture_height: config.texture_height,
            uniforms: RefractionUniforms::default(),
        }));

        let refractor = scene.add(
            Node::mesh(refractor_geometry, refractor_material)
                .with_name("refractor")
                .with_position(config.position),
        );
        let label = scene.add_child(
            refractor,
            Node::mesh(label_geometry, label_material)
                .with_name("refractor-label")
                .with_position(config.text_position),
        )?;

        inner.surfaces = Some(Surfaces {
            refractor,
            refractor_geometry,
            refractor_material,
            label,
            label_geometry,
            label_material,
            label_texture,
            distortion: None,
        });
        inner.pending_distortion = Some(loader.load_async(&config.distortion_map));
        inner.state = LabelState::Ready;
        tracing::debug!(refractor = %refractor.short(), label = %label.short(), "refractor ready");
        Ok(())
    }

    /// Wire pointer handlers onto `surface`.
    ///
    /// Moving the pointer over the label tints it and switches the cursor to
    /// a pointer; moving off reverts both. A click re-casts the ray through
    /// the last pointer position and calls `on_click` on a hit. The handlers
    /// stay registered until the caller removes them.
    pub fn setup_interaction(
        &self,
        camera: CameraRef,
        surface: &mut RenderSurface,
        on_click: Option<Box<dyn FnMut()>>,
    ) -> Result<InteractionHandlers, LabelError> {
        self.inner.borrow().ready()?;

        let inner = Rc::clone(&self.inner);
        let scene = Rc::clone(&self.scene);
        let cam = Rc::clone(&camera);
        let on_move = surface.add_listener(
            PointerEventKind::Move,
            move |event, state: &mut SurfaceState| {
                let mut inner = inner.borrow_mut();
                let Ok(surfaces) = inner.ready() else {
                    return;
                };
                let client = event.client_position();
                inner.pointer = state.rect.to_ndc(client.x, client.y);

                let hit = inner.label_hit(&scene.borrow(), &cam.borrow());
                if hit == inner.hovering {
                    return;
                }
                inner.hovering = hit;
                let mut scene = scene.borrow_mut();
                if hit {
                    set_tint(&mut scene, surfaces.label, HOVER_COLOR, Some(1.0));
                    state.cursor = CursorStyle::Pointer;
                    tracing::trace!("label hover start");
                } else {
                    set_tint(&mut scene, surfaces.label, Color::WHITE, None);
                    state.cursor = CursorStyle::Default;
                    tracing::trace!("label hover end");
                }
            },
        );

        let inner = Rc::clone(&self.inner);
        let scene = Rc::clone(&self.scene);
        let mut callback = on_click;
        let on_click = surface.add_listener(PointerEventKind::Click, move |_, _| {
            let hit = inner.borrow().label_hit(&scene.borrow(), &camera.borrow());
            if hit {
                tracing::debug!("label clicked");
                if let Some(f) = callback.as_mut() {
                    f();
                }
            }
        });

        Ok(InteractionHandlers { on_move, on_click })
    }

    /// Redraw the label with `text`. The previous raster is released.
    pub fn update_text(&self, text: &str) -> Result<(), LabelError> {
        let mut inner = self.inner.borrow_mut();
        let mut surfaces = inner.ready()?;
        let mut scene = self.scene.borrow_mut();

        let raster = inner.rasterizer.rasterize(text);
        let texture = scene.add_texture(label_raster_texture(raster));
        if let Err(e) = install_label_map(&mut scene, surfaces, texture) {
            scene.release_texture(texture);
            return Err(e);
        }
        scene.release_texture(surfaces.label_texture);

        surfaces.label_texture = texture;
        inner.surfaces = Some(surfaces);
        inner.text = text.to_owned();
        tracing::debug!(text, "label text updated");
        Ok(())
    }

    /// Move the refractor, label included, relative to its parent.
    pub fn set_position(&self, x: f32, y: f32, z: f32) -> Result<(), LabelError> {
        let surfaces = self.inner.borrow().ready()?;
        self.move_node(surfaces.refractor, glam::Vec3::new(x, y, z))
    }

    /// Move the label relative to the refractor.
    pub fn set_text_position(&self, x: f32, y: f32, z: f32) -> Result<(), LabelError> {
        let surfaces = self.inner.borrow().ready()?;
        self.move_node(surfaces.label, glam::Vec3::new(x, y, z))
    }

    fn move_node(&self, id: NodeId, position: glam::Vec3) -> Result<(), LabelError> {
        if self.scene.borrow_mut().set_position(id, position) {
            Ok(())
        } else {
            Err(SceneError::NodeNotFound(id).into())
        }
    }

    /// Per-frame update: feed `time` to the refraction shader and pick up
    /// the distortion map if it has arrived. Does nothing before `init`.
    pub fn animate(&self, time: f32) -> Result<(), LabelError> {
        let mut inner = self.inner.borrow_mut();
        let surfaces = match inner.ready() {
            Ok(surfaces) => surfaces,
            Err(LabelError::NotReady) => return Ok(()),
            Err(e) => return Err(e),
        };
        let mut scene = self.scene.borrow_mut();
        inner.poll_distortion(&mut scene)?;
        if let Some(refraction) = scene
            .mesh_material_mut(surfaces.refractor)?
            .as_refraction_mut()
        {
            refraction.uniforms.time = time;
        }
        Ok(())
    }

    /// Check the distortion-map load without advancing time. Returns the
    /// installed texture, if any.
    pub fn poll_distortion(&self) -> Result<Option<TextureId>, LabelError> {
        let mut inner = self.inner.borrow_mut();
        inner.poll_distortion(&mut self.scene.borrow_mut())?;
        Ok(inner.surfaces.and_then(|s| s.distortion))
    }

    pub fn is_distortion_pending(&self) -> bool {
        self.inner.borrow().pending_distortion.is_some()
    }

    /// Remove the refractor and its label from the scene and release every
    /// resource they own. A pending distortion load is cancelled. Calling
    /// this again does nothing.
    pub fn dispose(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == LabelState::Disposed {
            return;
        }
        inner.state = LabelState::Disposed;
        inner.hovering = false;
        if let Some(mut pending) = inner.pending_distortion.take() {
            pending.cancel();
        }
        let Some(surfaces) = inner.surfaces.take() else {
            tracing::debug!("disposed before init");
            return;
        };

        let mut scene = self.scene.borrow_mut();
        scene.remove(surfaces.refractor);
        scene.release_geometry(surfaces.refractor_geometry);
        scene.release_material(surfaces.refractor_material);
        scene.release_geometry(surfaces.label_geometry);
        scene.release_material(surfaces.label_material);
        scene.release_texture(surfaces.label_texture);
        if let Some(distortion) = surfaces.distortion {
            scene.release_texture(distortion);
        }
        tracing::debug!(refractor = %surfaces.refractor.short(), "refractor disposed");
    }

    pub fn state(&self) -> LabelState {
        self.inner.borrow().state
    }

    pub fn is_hovering(&self) -> bool {
        self.inner.borrow().hovering
    }

    pub fn refractor(&self) -> Option<NodeId> {
        self.inner.borrow().surfaces.map(|s| s.refractor)
    }

    pub fn label(&self) -> Option<NodeId> {
        self.inner.borrow().surfaces.map(|s| s.label)
    }

    pub fn label_texture(&self) -> Option<TextureId> {
        self.inner.borrow().surfaces.map(|s| s.label_texture)
    }

    pub fn text(&self) -> String {
        self.inner.borrow().text.clone()
    }

    pub fn config(&self) -> &RefractiveLabelConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneRef {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use image::RgbaImage;
    use std::cell::Cell;
    use std::path::Path;
    use vitrine_assets::{AssetError, MemoryTextureLoader, TextureSender};
    use vitrine_input::{PointerEvent, SurfaceRect};
    use vitrine_scene::{ResourceId, SceneEvent, WrapMode};

    fn new_scene() -> SceneRef {
        Rc::new(RefCell::new(Scene::new()))
    }

    fn with_dudv() -> MemoryTextureLoader {
        MemoryTextureLoader::new().with("textures/waterdudv.jpg", RgbaImage::new(8, 8))
    }

    /// Loader whose fetch completes only when the test says so.
    #[derive(Default)]
    struct ManualLoader {
        sender: RefCell<Option<TextureSender>>,
    }

    impl TextureLoader for ManualLoader {
        fn load(&self, path: &Path) -> Result<RgbaImage, AssetError> {
            Err(AssetError::NotFound(path.to_path_buf()))
        }

        fn load_async(&self, path: &Path) -> PendingTexture {
            let (sender, pending) = PendingTexture::channel(path);
            *self.sender.borrow_mut() = Some(sender);
            pending
        }
    }

    struct Rig {
        scene: SceneRef,
        camera: CameraRef,
        surface: RenderSurface,
        label: RefractorText,
        clicks: Rc<Cell<u32>>,
    }

    fn rig() -> Rig {
        let scene = new_scene();
        let label =
            RefractorText::spawn(Rc::clone(&scene), RefractiveLabelConfig::default(), &with_dudv())
                .unwrap();
        let camera = Rc::new(RefCell::new(PerspectiveCamera::default()));
        let mut surface = RenderSurface::new(SurfaceRect::new(1280.0, 720.0));
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        label
            .setup_interaction(
                Rc::clone(&camera),
                &mut surface,
                Some(Box::new(move || counter.set(counter.get() + 1))),
            )
            .unwrap();
        Rig {
            scene,
            camera,
            surface,
            label,
            clicks,
        }
    }

    impl Rig {
        /// Client coordinates of the label's centre.
        fn over_label(&self) -> Vec2 {
            let world = self
                .scene
                .borrow()
                .world_position(self.label.label().unwrap())
                .unwrap();
            let ndc = self.camera.borrow().project(world);
            self.surface.rect().to_client(ndc.truncate())
        }

        fn move_to(&mut self, at: Vec2) {
            self.surface.dispatch(&PointerEvent::Move {
                client_x: at.x,
                client_y: at.y,
            });
        }

        fn click(&mut self) {
            self.surface.dispatch(&PointerEvent::Click {
                client_x: 0.0,
                client_y: 0.0,
            });
        }

        fn label_material(&self) -> BasicMaterial {
            self.scene
                .borrow()
                .mesh_material(self.label.label().unwrap())
                .unwrap()
                .as_basic()
                .unwrap()
                .clone()
        }
    }

    #[test]
    fn default_label_is_one_refractor_with_one_child() {
        let scene = new_scene();
        let label =
            RefractorText::spawn(Rc::clone(&scene), RefractiveLabelConfig::default(), &with_dudv())
                .unwrap();
        let scene = scene.borrow();
        let refractor = label.refractor().unwrap();

        assert_eq!(scene.roots(), &[refractor]);
        assert_eq!(scene.children(refractor).len(), 1);
        let child = scene.children(refractor)[0];
        assert_eq!(Some(child), label.label());
        assert_eq!(
            scene.get(child).unwrap().transform.position,
            Vec3::new(30.0, 30.0, 0.01)
        );
        assert_eq!(scene.world_position(child).unwrap(), Vec3::new(30.0, 80.0, 0.01));

        let Material::Refraction(refraction) = scene.mesh_material(refractor).unwrap() else {
            panic!("refractor uses a refraction material");
        };
        assert_eq!(refraction.color.hex(), 0xcbcbcb);
        assert_eq!((refraction.texture_width, refraction.texture_height), (1024, 1024));
    }

    #[test]
    fn label_texture_is_srgb_card() {
        let r = rig();
        let material = r.label_material();
        assert!(material.transparent);
        let scene = r.scene.borrow();
        let texture = scene.resources().texture(material.map.unwrap()).unwrap();
        assert_eq!(texture.color_space, ColorSpace::Srgb);
        assert_eq!(texture.anisotropy, 8);
        assert_eq!((texture.width(), texture.height()), (256, 100));
    }

    #[test]
    fn lifecycle_guards() {
        let scene = new_scene();
        let label = RefractorText::new(Rc::clone(&scene), RefractiveLabelConfig::default());
        assert_eq!(label.state(), LabelState::Uninitialized);
        assert_eq!(scene.borrow().node_count(), 0);

        assert!(label.animate(1.0).is_ok());
        assert!(matches!(label.set_position(0.0, 0.0, 0.0), Err(LabelError::NotReady)));
        assert!(matches!(label.update_text("A"), Err(LabelError::NotReady)));

        label.init(&with_dudv()).unwrap();
        assert_eq!(label.state(), LabelState::Ready);
        label.init(&with_dudv()).unwrap();
        assert_eq!(scene.borrow().node_count(), 2);

        label.dispose();
        assert_eq!(label.state(), LabelState::Disposed);
        assert!(matches!(label.animate(1.0), Err(LabelError::Disposed)));
        assert!(matches!(label.set_text_position(0.0, 0.0, 0.0), Err(LabelError::Disposed)));
        assert!(matches!(label.init(&with_dudv()), Err(LabelError::Disposed)));
    }

    #[test]
    fn animate_drives_time_uniform() {
        let r = rig();
        r.label.animate(2.5).unwrap();
        let scene = r.scene.borrow();
        let refraction = scene
            .mesh_material(r.label.refractor().unwrap())
            .unwrap()
            .as_refraction()
            .unwrap();
        assert_eq!(refraction.uniforms.time, 2.5);
    }

    #[test]
    fn positions_are_absolute() {
        let r = rig();
        r.label.set_position(1.0, 2.0, 3.0).unwrap();
        r.label.set_position(1.0, 2.0, 3.0).unwrap();
        r.label.set_text_position(0.0, 0.0, 1.0).unwrap();
        let scene = r.scene.borrow();
        assert_eq!(
            scene.world_position(r.label.label().unwrap()).unwrap(),
            Vec3::new(1.0, 2.0, 4.0)
        );
    }

    #[test]
    fn distortion_map_installs_on_next_frame() {
        let r = rig();
        assert!(r.label.is_distortion_pending());
        r.label.animate(0.0).unwrap();
        assert!(!r.label.is_distortion_pending());

        let scene = r.scene.borrow();
        let refraction = scene
            .mesh_material(r.label.refractor().unwrap())
            .unwrap()
            .as_refraction()
            .unwrap();
        let texture = scene
            .resources()
            .texture(refraction.uniforms.distortion.unwrap())
            .unwrap();
        assert_eq!(texture.wrap, WrapMode::Repeat);
    }

    #[test]
    fn missing_distortion_map_degrades() {
        let scene = new_scene();
        let label = RefractorText::spawn(
            Rc::clone(&scene),
            RefractiveLabelConfig::default(),
            &MemoryTextureLoader::new(),
        )
        .unwrap();
        assert_eq!(label.poll_distortion().unwrap(), None);
        assert!(!label.is_distortion_pending());
        label.animate(1.0).unwrap();
        assert_eq!(scene.borrow().node_count(), 2);
        let scene = scene.borrow();
        let refraction = scene
            .mesh_material(label.refractor().unwrap())
            .unwrap()
            .as_refraction()
            .unwrap();
        assert_eq!(refraction.uniforms.distortion, None);
        assert_eq!(refraction.uniforms.time, 1.0);
    }

    #[test]
    fn deferred_distortion_arrives_later() {
        let scene = new_scene();
        let loader = ManualLoader::default();
        let label =
            RefractorText::spawn(Rc::clone(&scene), RefractiveLabelConfig::default(), &loader)
                .unwrap();

        // Visible before the fetch resolves.
        assert_eq!(scene.borrow().roots().len(), 1);
        label.animate(0.1).unwrap();
        assert_eq!(label.poll_distortion().unwrap(), None);
        assert!(label.is_distortion_pending());

        let sender = loader.sender.borrow_mut().take().unwrap();
        assert!(sender.complete(Ok(RgbaImage::new(4, 4))));
        label.animate(0.2).unwrap();
        assert!(label.poll_distortion().unwrap().is_some());
    }

    #[test]
    fn dispose_cancels_pending_distortion() {
        let scene = new_scene();
        let loader = ManualLoader::default();
        let label =
            RefractorText::spawn(Rc::clone(&scene), RefractiveLabelConfig::default(), &loader)
                .unwrap();
        label.dispose();

        let sender = loader.sender.borrow_mut().take().unwrap();
        assert!(!sender.is_live());
        assert!(!sender.complete(Ok(RgbaImage::new(4, 4))));
        assert_eq!(scene.borrow().resources().texture_count(), 0);
    }

    #[test]
    fn hover_enter_and_exit() {
        let mut r = rig();
        let over = r.over_label();

        r.move_to(over);
        assert!(r.label.is_hovering());
        assert_eq!(r.surface.cursor(), CursorStyle::Pointer);
        let material = r.label_material();
        assert_eq!(material.color, HOVER_COLOR);
        assert_eq!(material.opacity, 1.0);

        r.move_to(Vec2::ZERO);
        assert!(!r.label.is_hovering());
        assert_eq!(r.surface.cursor(), CursorStyle::Default);
        assert_eq!(r.label_material().color, Color::WHITE);
    }

    #[test]
    fn repeated_hits_do_not_restyle() {
        let mut r = rig();
        let over = r.over_label();
        r.move_to(over);
        r.surface.set_cursor(CursorStyle::Default);
        r.scene
            .borrow_mut()
            .mesh_material_mut(r.label.label().unwrap())
            .unwrap()
            .as_basic_mut()
            .unwrap()
            .color = Color::BLACK;

        r.move_to(over + Vec2::new(1.0, 0.0));
        assert!(r.label.is_hovering());
        assert_eq!(r.surface.cursor(), CursorStyle::Default);
        assert_eq!(r.label_material().color, Color::BLACK);
    }

    #[test]
    fn click_after_miss_is_ignored() {
        let mut r = rig();
        r.move_to(Vec2::ZERO);
        r.click();
        assert_eq!(r.clicks.get(), 0);

        let over = r.over_label();
        r.move_to(over);
        r.click();
        assert_eq!(r.clicks.get(), 1);
    }

    #[test]
    fn click_before_any_move_misses() {
        let mut r = rig();
        r.click();
        assert_eq!(r.clicks.get(), 0);
    }

    #[test]
    fn handlers_go_quiet_after_dispose() {
        let mut r = rig();
        let over = r.over_label();
        r.move_to(over);
        r.label.dispose();
        r.surface.set_cursor(CursorStyle::Default);

        r.move_to(over);
        r.click();
        assert_eq!(r.clicks.get(), 0);
        assert!(!r.label.is_hovering());
        assert_eq!(r.surface.cursor(), CursorStyle::Default);
    }

    #[test]
    fn handlers_can_be_removed() {
        let scene = new_scene();
        let label =
            RefractorText::spawn(Rc::clone(&scene), RefractiveLabelConfig::default(), &with_dudv())
                .unwrap();
        let camera = Rc::new(RefCell::new(PerspectiveCamera::default()));
        let mut surface = RenderSurface::default();
        let handlers = label.setup_interaction(camera, &mut surface, None).unwrap();
        assert_eq!(surface.listener_count(), 2);
        assert!(handlers.remove(&mut surface));
        assert_eq!(surface.listener_count(), 0);
        assert!(!handlers.remove(&mut surface));
    }

    #[test]
    fn update_text_is_idempotent_and_releases_old_raster() {
        let r = rig();
        r.scene.borrow_mut().drain_events();
        let original = r.label.label_texture().unwrap();
        let version = r.label_material().version;

        r.label.update_text("X").unwrap();
        let first = r.label.label_texture().unwrap();
        let first_raster = r.scene.borrow().resources().texture(first).unwrap().image.clone();

        r.label.update_text("X").unwrap();
        let second = r.label.label_texture().unwrap();
        let scene = r.scene.borrow();
        assert_eq!(scene.resources().texture(second).unwrap().image, first_raster);
        assert_eq!(r.label.text(), "X");
        assert_eq!(r.label_material().map, Some(second));
        assert_eq!(r.label_material().version, version + 2);

        let released: Vec<_> = scene
            .events()
            .iter()
            .filter_map(|e| match e {
                SceneEvent::Released(ResourceId::Texture(t)) => Some(*t),
                _ => None,
            })
            .collect();
        assert_eq!(released, vec![original, first]);
        assert!(scene.resources().texture(original).is_none());
    }

    #[test]
    fn different_text_draws_different_raster() {
        let r = rig();
        let raster = |label: &RefractorText| {
            let id = label.label_texture().unwrap();
            r.scene.borrow().resources().texture(id).unwrap().image.clone()
        };
        r.label.update_text("A").unwrap();
        let narrow = raster(&r.label);
        r.label.update_text("WWWWW").unwrap();
        let wide = raster(&r.label);
        assert_ne!(narrow, wide);
        assert!(narrow.pixels().any(|p| p.0[3] > 128));
    }

    #[test]
    fn failed_update_releases_new_raster() {
        let r = rig();
        let before = r.label.label_texture().unwrap();
        let label = r.label.label().unwrap();
        r.scene.borrow_mut().remove(label);
        let textures = r.scene.borrow().resources().texture_count();

        let err = r.label.update_text("B").unwrap_err();
        assert!(matches!(err, LabelError::Scene(SceneError::NodeNotFound(_))));
        assert_eq!(r.scene.borrow().resources().texture_count(), textures);
        assert_eq!(r.label.label_texture(), Some(before));
        assert_eq!(r.label.text(), "REFRACTION");
    }

    #[test]
    fn label_seen_from_behind_is_not_interactive() {
        let mut r = rig();
        let aspect = r.surface.rect().aspect();
        *r.camera.borrow_mut() =
            PerspectiveCamera::new(Vec3::new(30.0, 80.0, -100.0), Vec3::new(30.0, 80.0, 0.0))
                .with_aspect(aspect);
        let over = r.over_label();
        r.move_to(over);
        r.click();
        assert!(!r.label.is_hovering());
        assert_eq!(r.clicks.get(), 0);
    }

    #[test]
    fn dispose_twice_releases_once() {
        let r = rig();
        r.label.animate(0.0).unwrap();
        r.scene.borrow_mut().drain_events();

        r.label.dispose();
        let events = r.scene.borrow_mut().drain_events();
        let removed = events
            .iter()
            .filter(|e| matches!(e, SceneEvent::Removed { .. }))
            .count();
        let released = events
            .iter()
            .filter(|e| matches!(e, SceneEvent::Released(_)))
            .count();
        assert_eq!(removed, 2);
        // Two geometries, two materials, label raster and distortion map.
        assert_eq!(released, 6);

        r.label.dispose();
        let scene = r.scene.borrow();
        assert!(scene.events().is_empty());
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.resources().texture_count(), 0);
        assert_eq!(scene.resources().material_count(), 0);
    }

    #[test]
    fn dispose_before_init_is_harmless() {
        let scene = new_scene();
        let label = RefractorText::new(Rc::clone(&scene), RefractiveLabelConfig::default());
        label.dispose();
        label.dispose();
        assert_eq!(label.state(), LabelState::Disposed);
        assert!(scene.borrow().events().is_empty());
    }
}
