//! Screen identification from a handful of pixel probes.
//!
//! Every screen owns one or more signatures. A signature is a list of
//! normalized points and the colour expected there; a screen matches when all
//! points of any one of its signatures are within [`COLOR_TOLERANCE`] per
//! channel. Screens are tried in [`Screen::ALL`] order and the first match
//! wins.

use tracing::trace;

use crate::math::NormPos;
use crate::screen::Screen;

/// An RGB triple.
pub type Rgb = [u8; 3];

/// Maximum per-channel difference for two colours to count as equal.
pub const COLOR_TOLERANCE: u8 = 5;

/// Colour of the highlighted page dot on the map picker.
pub const SELECTED_PAGE_COLOR: Rgb = [64, 159, 255];

/// Page indicator dots on the map picker, one per page, left to right.
pub const MAP_PAGE_DOTS: [(f64, f64); 15] = [
    (0.365, 0.703),
    (0.384, 0.703),
    (0.404, 0.703),
    (0.423, 0.703),
    (0.443, 0.703),
    (0.462, 0.703),
    (0.481, 0.703),
    (0.500, 0.703),
    (0.519, 0.703),
    (0.539, 0.703),
    (0.558, 0.703),
    (0.578, 0.703),
    (0.597, 0.703),
    (0.616, 0.703),
    (0.635, 0.703),
];

/// One probe: where to look and what colour to expect.
pub type Probe = ((f64, f64), Rgb);

/// Anything that can report the colour under a normalized position.
pub trait PixelProbe {
    /// Colour at the position, or `None` when it lies outside the image.
    fn pixel(&self, at: NormPos) -> Option<Rgb>;
}

/// What the identifier saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identification {
    /// Matched screen.
    pub screen: Screen,
    /// Zero-based selected page, only on the map picker and only if readable.
    pub map_page: Option<usize>,
}

/// Per-channel closeness check.
#[must_use]
pub fn color_close(a: Rgb, b: Rgb, tolerance: u8) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= tolerance)
}

/// Identifier signatures for a screen.
#[must_use]
pub fn signatures(screen: Screen) -> &'static [&'static [Probe]] {
    match screen {
        Screen::MainMenu => &[&[((0.5, 0.875), [255, 255, 255]), ((0.957, 0.043), [255, 220, 0])]],
        Screen::MapSelect => &[&[((0.298, 0.901), [255, 197, 0]), ((0.948, 0.077), [0, 195, 255])]],
        Screen::InGame => &[&[
            ((0.878, 0.919), [255, 222, 0]),
            ((0.880, 0.960), [255, 207, 0]),
            ((0.904, 0.935), [255, 217, 0]),
            ((0.897, 0.968), [255, 196, 0]),
            ((0.892, 0.952), [255, 255, 255]),
            ((0.890, 0.925), [255, 255, 255]),
            ((0.149, 0.038), [255, 187, 0]),
            ((0.881, 0.056), [59, 214, 0]),
        ]],
        Screen::PauseMenu => &[&[((0.341, 0.747), [0, 221, 255])]],
        Screen::RestartPopup => &[&[
            ((0.264, 0.331), [255, 195, 0]),
            ((0.588, 0.371), [113, 232, 0]),
        ]],
        Screen::SandboxStartPopup => &[&[
            ((0.468, 0.705), [93, 225, 0]),
            ((0.501, 0.255), [255, 204, 68]),
            ((0.164, 0.017), [255, 199, 0]),
        ]],
        Screen::SandboxBloons => &[
            &[
                ((0.823, 0.697), [0, 221, 255]),
                ((0.822, 0.806), [255, 196, 0]),
                ((0.823, 0.858), [255, 121, 0]),
                ((0.822, 0.947), [255, 116, 0]),
                ((0.148, 0.047), [255, 162, 0]),
                ((0.943, 0.104), [84, 222, 0]),
            ],
            &[
                ((0.872, 0.914), [0, 212, 245]),
                ((0.871, 0.967), [0, 190, 245]),
                ((0.909, 0.909), [0, 212, 245]),
                ((0.911, 0.968), [0, 188, 245]),
                ((0.899, 0.931), [245, 245, 245]),
                ((0.883, 0.922), [245, 245, 245]),
                ((0.877, 0.956), [245, 245, 245]),
            ],
        ],
        Screen::SandboxMonkeys => &[
            &[
                ((0.874, 0.915), [245, 212, 0]),
                ((0.907, 0.914), [245, 212, 0]),
                ((0.873, 0.944), [245, 203, 0]),
                ((0.909, 0.944), [245, 203, 0]),
                ((0.902, 0.944), [244, 244, 244]),
                ((0.880, 0.942), [245, 245, 245]),
                ((0.891, 0.914), [245, 245, 245]),
            ],
            &[
                ((0.875, 0.913), [255, 221, 0]),
                ((0.882, 0.924), [255, 255, 255]),
                ((0.874, 0.961), [255, 201, 0]),
                ((0.882, 0.947), [255, 255, 255]),
                ((0.901, 0.925), [254, 254, 254]),
                ((0.908, 0.910), [255, 221, 0]),
                ((0.148, 0.037), [255, 187, 0]),
                ((0.881, 0.048), [77, 220, 0]),
            ],
        ],
        Screen::GameOverSummary => &[&[
            ((0.325, 0.180), [255, 60, 0]),
            ((0.472, 0.185), [255, 56, 0]),
            ((0.654, 0.177), [255, 62, 0]),
            ((0.539, 0.843), [102, 228, 0]),
        ]],
        Screen::GameOverRewards => &[&[
            ((0.469, 0.154), [163, 81, 33]),
            ((0.331, 0.337), [255, 38, 0]),
            ((0.668, 0.324), [255, 48, 0]),
            ((0.665, 0.711), [113, 232, 0]),
            ((0.554, 0.706), [0, 221, 255]),
            ((0.443, 0.707), [255, 221, 0]),
            ((0.327, 0.706), [0, 221, 255]),
        ]],
    }
}

fn signature_matches(probe: &impl PixelProbe, signature: &[Probe]) -> bool {
    signature.iter().all(|&((x, y), expected)| {
        probe
            .pixel(NormPos::new(x, y))
            .is_some_and(|seen| color_close(seen, expected, COLOR_TOLERANCE))
    })
}

/// Identify the screen shown in a capture of the whole window.
#[must_use]
pub fn identify_screen(probe: &impl PixelProbe) -> Option<Identification> {
    for screen in Screen::ALL {
        if signatures(screen)
            .iter()
            .any(|signature| signature_matches(probe, signature))
        {
            let map_page = if screen == Screen::MapSelect {
                identify_map_page(probe)
            } else {
                None
            };
            trace!(%screen, ?map_page, "Screen identified");
            return Some(Identification { screen, map_page });
        }
    }
    trace!("Could not identify current screen");
    None
}

/// Zero-based index of the highlighted page dot on the map picker.
#[must_use]
pub fn identify_map_page(probe: &impl PixelProbe) -> Option<usize> {
    MAP_PAGE_DOTS.iter().position(|&(x, y)| {
        probe
            .pixel(NormPos::new(x, y))
            .is_some_and(|seen| color_close(seen, SELECTED_PAGE_COLOR, COLOR_TOLERANCE))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sparse probe: listed pixels, black elsewhere.
    struct Painted(Vec<((f64, f64), Rgb)>);

    impl PixelProbe for Painted {
        fn pixel(&self, at: NormPos) -> Option<Rgb> {
            Some(
                self.0
                    .iter()
                    .find(|((x, y), _)| NormPos::new(*x, *y).approx_eq(at, 1e-9))
                    .map_or([0, 0, 0], |(_, c)| *c),
            )
        }
    }

    fn painted(screen: Screen) -> Painted {
        Painted(signatures(screen)[0].to_vec())
    }

    #[test]
    fn test_color_close() {
        assert!(color_close([255, 220, 0], [252, 224, 5], 5));
        assert!(!color_close([255, 220, 0], [249, 220, 0], 5));
    }

    #[test]
    fn test_every_screen_identifies_itself() {
        for screen in Screen::ALL {
            let found = identify_screen(&painted(screen)).unwrap();
            assert_eq!(found.screen, screen, "signature of {screen} matched another screen");
        }
    }

    #[test]
    fn test_second_signature_matches() {
        let probe = Painted(signatures(Screen::SandboxBloons)[1].to_vec());
        assert_eq!(identify_screen(&probe).unwrap().screen, Screen::SandboxBloons);
    }

    #[test]
    fn test_blank_capture_unidentified() {
        assert_eq!(identify_screen(&Painted(Vec::new())), None);
    }

    #[test]
    fn test_map_page_identified() {
        let mut probe = painted(Screen::MapSelect);
        probe.0.push((MAP_PAGE_DOTS[6], SELECTED_PAGE_COLOR));
        let found = identify_screen(&probe).unwrap();
        assert_eq!(found.screen, Screen::MapSelect);
        assert_eq!(found.map_page, Some(6));
    }

    #[test]
    fn test_map_page_unreadable() {
        let found = identify_screen(&painted(Screen::MapSelect)).unwrap();
        assert_eq!(found.map_page, None);
    }
}
