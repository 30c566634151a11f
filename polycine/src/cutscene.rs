//! Cutscene assembly
//!
//! A [`Cutscene`] combines the two parsed assets of one animated
//! sequence: the shapes and palettes of the `.POL` file and the script
//! of the `.CMD` file. It is immutable after construction and shared
//! (`Arc`) between the VM, the renderer and any debug tooling.

use poly_cmd::{Script, parse_cmd};
use poly_pol::{Palette, Shape, parse_pol};

use crate::error::PlayerError;

/// One cutscene's complete data, immutable after construction
#[derive(Debug, Clone)]
pub struct Cutscene {
    /// Upper-case cutscene name (`"INTRO1"`)
    pub name: String,
    /// Shapes indexed by id
    pub shapes: Vec<Shape>,
    /// 16-colour palettes referenced by `setPalette`
    pub palettes: Vec<Palette>,
    /// The bytecode script
    pub script: Script,
}

impl Cutscene {
    /// Build a cutscene from its raw CMD and POL bytes
    ///
    /// Parse errors propagate; nothing is installed on failure.
    pub fn from_bytes(name: &str, cmd: &[u8], pol: &[u8]) -> Result<Self, PlayerError> {
        let pol = parse_pol(pol)?;
        let script = parse_cmd(cmd)?;
        Ok(Self {
            name: name.to_ascii_uppercase(),
            shapes: pol.shapes,
            palettes: pol.palettes,
            script,
        })
    }

    /// Total number of frames across all subscenes
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.script.frame_count()
    }

    /// Look up a shape by id
    #[inline]
    pub fn shape(&self, id: u16) -> Option<&Shape> {
        self.shapes.get(id as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata;

    #[test]
    fn test_from_bytes() {
        let cs = Cutscene::from_bytes("test", &testdata::cmd_two_frames(), &testdata::pol_basic())
            .unwrap();
        assert_eq!(cs.name, "TEST");
        assert!(cs.frame_count() >= 2);
        assert!(cs.shape(0).is_some());
        assert!(cs.shape(999).is_none());
    }

    #[test]
    fn test_bad_assets_do_not_install() {
        assert!(Cutscene::from_bytes("x", &[0u8; 1], &testdata::pol_basic()).is_err());
        assert!(Cutscene::from_bytes("x", &testdata::cmd_two_frames(), &[0u8; 4]).is_err());
    }
}
