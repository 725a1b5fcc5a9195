//! Renderer-agnostic description of what to draw.
//!
//! Coordinates are world units; the renderer applies the viewport
//! transform. Colours are packed `0xRRGGBB`.

use starmap_core::DivisionRegistry;
use starmap_spatial::orbit::{self, belt_dots, body_position};
use starmap_spatial::{Point, Tessellation};
use starmap_types::color::rgb_to_packed;
use starmap_types::{AdminLevels, Galaxy, GalaxyTarget, Star};

use crate::mode::ModeHandler;

const STAR_COLOR: u32 = 0x00ee_eeee;
const HIGHLIGHT_COLOR: u32 = 0x00ff_ff00;
const LANE_COLOR: u32 = 0x0055_b7ff;
const TERRITORY_DEFAULT: u32 = 0x0033_3333;
const SUN_COLOR: u32 = 0x00ff_ffff;
const ORBIT_COLOR: u32 = 0x0044_4444;
const BELT_COLOR: u32 = 0x0066_6666;
const BODY_COLOR: u32 = 0x0088_8888;

/// Below this zoom, coloured territories are drawn more opaque.
const OVERVIEW_ZOOM: f64 = 0.5;

/// Stroke around a filled shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    /// Stroke width in world units.
    pub width: f64,
    /// Stroke colour.
    pub color: u32,
    /// Stroke opacity.
    pub alpha: f64,
}

/// One drawable primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// A filled circle.
    Circle {
        /// Centre.
        center: Point,
        /// Radius.
        radius: f64,
        /// Fill colour.
        fill: u32,
        /// Fill opacity.
        alpha: f64,
        /// Optional stroke.
        outline: Option<Outline>,
    },
    /// A stroked segment.
    Line {
        /// Start.
        from: Point,
        /// End.
        to: Point,
        /// Stroke.
        stroke: Outline,
    },
    /// A filled closed polygon.
    Polygon {
        /// Vertices in order.
        points: Vec<Point>,
        /// Fill colour.
        fill: u32,
        /// Fill opacity.
        alpha: f64,
        /// Stroke.
        outline: Outline,
    },
    /// A stroked unfilled circle.
    Ring {
        /// Centre.
        center: Point,
        /// Radius.
        radius: f64,
        /// Stroke.
        stroke: Outline,
    },
}

/// Shapes in draw order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Back to front.
    pub shapes: Vec<Shape>,
}

/// Inputs for drawing the galaxy view.
#[derive(Clone, Copy)]
pub struct GalaxyView<'a> {
    /// The galaxy.
    pub galaxy: &'a Galaxy,
    /// Each star's levels resolved at the current year, by index.
    pub levels: &'a [AdminLevels],
    /// Division names and colours.
    pub registry: &'a DivisionRegistry,
    /// Current year.
    pub year: i32,
    /// Active mode.
    pub mode: &'a dyn ModeHandler,
    /// Galaxy selection.
    pub selection: Option<GalaxyTarget>,
    /// Territory cells.
    pub territories: &'a Tessellation,
    /// Current zoom.
    pub zoom: f64,
}

impl GalaxyView<'_> {
    /// Colour of the division `levels` belongs to at the focus depth.
    fn tint(&self, levels: &AdminLevels) -> Option<u32> {
        let depth = self.mode.focus().len();
        let path = levels.path();
        let prefix = path.get(..=depth)?;
        self.registry
            .division_color(prefix, self.year)
            .map(|c| rgb_to_packed(Some(c)))
    }

    fn levels_of(&self, star: usize) -> AdminLevels {
        self.levels.get(star).copied().unwrap_or(AdminLevels::EMPTY)
    }
}

/// Lanes, then stars, then territories.
pub fn galaxy_scene(view: &GalaxyView<'_>) -> Scene {
    let stars = &view.galaxy.stars;
    let mut shapes = Vec::with_capacity(
        view.galaxy
            .hyperlanes
            .len()
            .saturating_add(stars.len().saturating_mul(2)),
    );

    for (idx, lane) in view.galaxy.hyperlanes.iter().enumerate() {
        let (Some(a), Some(b)) = (stars.get(lane.a), stars.get(lane.b)) else {
            continue;
        };
        let selected = view.selection == Some(GalaxyTarget::Lane(idx));
        let stroke = if selected {
            Outline {
                width: 0.75,
                color: STAR_COLOR,
                alpha: 0.8,
            }
        } else {
            Outline {
                width: 0.5,
                color: LANE_COLOR,
                alpha: 0.5,
            }
        };
        shapes.push(Shape::Line {
            from: Point::of_star(a),
            to: Point::of_star(b),
            stroke,
        });
    }

    for (idx, star) in stars.iter().enumerate() {
        let levels = view.levels_of(idx);
        let selected = view.selection == Some(GalaxyTarget::Star(idx));
        let highlighted = view.mode.highlights(&levels);
        let fill = if view.mode.tints_stars() {
            view.tint(&levels).unwrap_or(STAR_COLOR)
        } else {
            STAR_COLOR
        };
        let outline_alpha = if selected {
            0.9
        } else if highlighted {
            0.8
        } else {
            0.0
        };
        shapes.push(Shape::Circle {
            center: Point::of_star(star),
            radius: if selected { 2.8 } else { 2.2 },
            fill,
            alpha: if selected { 1.0 } else { 0.9 },
            outline: Some(Outline {
                width: if selected { 0.45 } else { 0.0 },
                color: if highlighted { HIGHLIGHT_COLOR } else { STAR_COLOR },
                alpha: outline_alpha,
            }),
        });
    }

    if view.mode.shows_territories() {
        for (idx, cell) in view.territories.cells() {
            let (color, alpha) = view
                .tint(&view.levels_of(idx))
                .map_or((TERRITORY_DEFAULT, 0.1), |c| {
                    (c, if view.zoom < OVERVIEW_ZOOM { 0.4 } else { 0.2 })
                });
            shapes.push(Shape::Polygon {
                points: cell.to_vec(),
                fill: color,
                alpha,
                outline: Outline {
                    width: 0.5,
                    color,
                    alpha: 0.3,
                },
            });
        }
    }

    Scene { shapes }
}

/// The system view of `star`, which sits at `star_index` in the galaxy.
pub fn system_scene(star: &Star, star_index: usize) -> Scene {
    let mut shapes = vec![Shape::Circle {
        center: Point::ZERO,
        radius: 5.0,
        fill: SUN_COLOR,
        alpha: 1.0,
        outline: None,
    }];

    for body in star.bodies.iter().filter(|b| !b.is_belt()) {
        shapes.push(Shape::Ring {
            center: Point::ZERO,
            radius: orbit::orbit_radius(body),
            stroke: Outline {
                width: 1.0,
                color: ORBIT_COLOR,
                alpha: 0.5,
            },
        });
    }

    let count = star.bodies.len();
    for (idx, body) in star.bodies.iter().enumerate() {
        if body.is_belt() {
            shapes.extend(
                belt_dots(star_index, idx, body.distance_au)
                    .into_iter()
                    .map(|dot| Shape::Circle {
                        center: dot.at,
                        radius: dot.size,
                        fill: BELT_COLOR,
                        alpha: 0.8,
                        outline: None,
                    }),
            );
        } else {
            shapes.push(Shape::Circle {
                center: body_position(idx, count, body.distance_au),
                radius: 2.0,
                fill: body.color.map_or(BODY_COLOR, |c| rgb_to_packed(Some(c))),
                alpha: 1.0,
                outline: None,
            });
        }
    }

    Scene { shapes }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use starmap_types::{CelestialBody, CountryDefinition, Hyperlane};

    use super::*;
    use crate::mode::{PoliticalHandler, ViewHandler};

    fn galaxy() -> Galaxy {
        Galaxy {
            width: 100,
            height: 100,
            stars: vec![Star::at(0, 0), Star::at(50, 0), Star::at(25, 40)],
            hyperlanes: vec![Hyperlane { a: 0, b: 1 }],
            resources: Vec::new(),
        }
    }

    fn registry() -> DivisionRegistry {
        DivisionRegistry::new(vec![CountryDefinition {
            name: "Aurora".to_owned(),
            color: Some([255, 0, 0]),
            ..CountryDefinition::default()
        }])
    }

    #[test]
    fn galaxy_draws_lanes_stars_then_territories() {
        let g = galaxy();
        let reg = registry();
        let levels = [
            AdminLevels([Some(0), None, None, None]),
            AdminLevels::EMPTY,
            AdminLevels::EMPTY,
        ];
        let tess = Tessellation::from_stars(&g.stars, 100.0);
        let mode = ViewHandler;
        let scene = galaxy_scene(&GalaxyView {
            galaxy: &g,
            levels: &levels,
            registry: &reg,
            year: 2100,
            mode: &mode,
            selection: Some(GalaxyTarget::Star(1)),
            territories: &tess,
            zoom: 1.0,
        });
        assert_eq!(scene.shapes.len(), 1 + 3 + 3);
        assert!(matches!(scene.shapes[0], Shape::Line { .. }));
        let Shape::Circle { radius, fill, .. } = scene.shapes[2] else {
            panic!("expected the selected star");
        };
        assert_eq!((radius, fill), (2.8, STAR_COLOR));
        let Shape::Polygon { fill, alpha, .. } = &scene.shapes[4] else {
            panic!("expected a territory");
        };
        assert_eq!((*fill, *alpha), (0x00ff_0000, 0.2));
        let Shape::Polygon { fill, alpha, .. } = &scene.shapes[5] else {
            panic!("expected a territory");
        };
        assert_eq!((*fill, *alpha), (TERRITORY_DEFAULT, 0.1));
    }

    #[test]
    fn political_mode_tints_and_highlights() {
        let g = galaxy();
        let reg = registry();
        let levels = [
            AdminLevels([Some(0), None, None, None]),
            AdminLevels::EMPTY,
            AdminLevels::EMPTY,
        ];
        let tess = Tessellation::from_stars(&g.stars, 100.0);
        let mut mode = PoliticalHandler::default();
        mode.set_paint_target(Some(0));
        let scene = galaxy_scene(&GalaxyView {
            galaxy: &g,
            levels: &levels,
            registry: &reg,
            year: 2100,
            mode: &mode,
            selection: None,
            territories: &tess,
            zoom: 0.3,
        });
        let Shape::Circle { fill, outline, .. } = scene.shapes[1] else {
            panic!("expected a star");
        };
        assert_eq!(fill, 0x00ff_0000);
        assert_eq!(outline.unwrap().alpha, 0.0);
        let Shape::Circle { outline, .. } = scene.shapes[2] else {
            panic!("expected a star");
        };
        let outline = outline.unwrap();
        assert_eq!((outline.color, outline.alpha), (HIGHLIGHT_COLOR, 0.8));
        let Shape::Polygon { alpha, .. } = &scene.shapes[4] else {
            panic!("expected a territory");
        };
        assert_eq!(*alpha, 0.4);
    }

    #[test]
    fn system_draws_sun_orbits_and_belts() {
        let body = |kind: &str, d: f64| CelestialBody {
            name: String::new(),
            kind: kind.to_owned(),
            distance_au: d,
            angle_deg: 0.0,
            radius_km: 1000.0,
            color: None,
        };
        let star = Star {
            bodies: vec![body("planet", 1.0), body("asteroid_belt", 2.0)],
            ..Star::at(0, 0)
        };
        let scene = system_scene(&star, 4);
        // sun, one orbit, one planet, the belt dots
        assert_eq!(
            scene.shapes.len(),
            1 + 1 + 1 + usize::try_from(orbit::BELT_DOTS).unwrap()
        );
        assert!(matches!(scene.shapes[1], Shape::Ring { radius, .. } if radius == 230.0));
        assert_eq!(scene, system_scene(&star, 4));
    }
}
