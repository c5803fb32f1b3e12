//! Decorative scene dressing: an enclosing box of textured walls, a bouncing
//! sphere, a spinning sphere and a point light.
//!
//! Every factory adds its objects to the scene and hands back their ids. The
//! caller owns them from then on, including removal and resource release.
//! Animated elements hold no clock; feed them the frame time through
//! [`Animated::animate`].

mod lighting;
mod spheres;
mod walls;

pub use lighting::{LightingOptions, create_lighting};
pub use spheres::{
    Animated, BouncingSphere, BouncingSphereOptions, SpinningSphere, SpinningSphereOptions,
    bouncing_pose, create_bouncing_sphere, create_spinning_sphere,
};
pub use walls::{WALL_SIZE, WallTextures, create_walls};

pub fn crate_info() -> &'static str {
    "vitrine-decor v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("decor"));
    }
}
