use crate::error::ArrivalError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single signal head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Light {
    Red,
    Green,
    Yellow,
    /// Flashing amber: permissive left, yield to oncoming traffic.
    Orange,
}

impl Light {
    pub fn as_str(&self) -> &'static str {
        match self {
            Light::Red => "red",
            Light::Green => "green",
            Light::Yellow => "yellow",
            Light::Orange => "orange",
        }
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lane a car arrived in. The two straight lanes behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lane {
    Left,
    Straight1,
    Straight2,
    Right,
}

impl Lane {
    pub fn is_straight(&self) -> bool {
        matches!(self, Lane::Straight1 | Lane::Straight2)
    }

    pub fn token(&self) -> &'static str {
        match self {
            Lane::Left => "l",
            Lane::Straight1 => "s1",
            Lane::Straight2 => "s2",
            Lane::Right => "r",
        }
    }
}

impl FromStr for Lane {
    type Err = ArrivalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" => Ok(Lane::Left),
            "s1" => Ok(Lane::Straight1),
            "s2" => Ok(Lane::Straight2),
            "r" => Ok(Lane::Right),
            _ => Err(ArrivalError::InvalidLane(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The approach a car arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn axis(&self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::NorthSouth,
            Direction::East | Direction::West => Axis::EastWest,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Direction::North => "N",
            Direction::South => "S",
            Direction::East => "E",
            Direction::West => "W",
        }
    }
}

impl FromStr for Direction {
    type Err = ArrivalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N" => Ok(Direction::North),
            "S" => Ok(Direction::South),
            "E" => Ok(Direction::East),
            "W" => Ok(Direction::West),
            _ => Err(ArrivalError::InvalidDirection(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A pair of opposing directions that always move together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    NorthSouth,
    EastWest,
}

impl Axis {
    pub fn opposite(&self) -> Axis {
        match self {
            Axis::NorthSouth => Axis::EastWest,
            Axis::EastWest => Axis::NorthSouth,
        }
    }

    pub fn directions(&self) -> [Direction; 2] {
        match self {
            Axis::NorthSouth => [Direction::North, Direction::South],
            Axis::EastWest => [Direction::East, Direction::West],
        }
    }

    pub fn straight_phase(&self) -> Phase {
        match self {
            Axis::NorthSouth => Phase::NorthSouthStraight,
            Axis::EastWest => Phase::EastWestStraight,
        }
    }

    pub fn left_phase(&self) -> Phase {
        match self {
            Axis::NorthSouth => Phase::NorthSouthLeft,
            Axis::EastWest => Phase::EastWestLeft,
        }
    }
}

/// Macro-state of the intersection: who has right of way, and in which mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    NorthSouthStraight,
    NorthSouthLeft,
    EastWestStraight,
    EastWestLeft,
}

impl Phase {
    pub fn axis(&self) -> Axis {
        match self {
            Phase::NorthSouthStraight | Phase::NorthSouthLeft => Axis::NorthSouth,
            Phase::EastWestStraight | Phase::EastWestLeft => Axis::EastWest,
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Phase::NorthSouthLeft | Phase::EastWestLeft)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Signal heads for one approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionLights {
    /// Governs straight and right-turn movement.
    pub main_light: Light,
    /// Governs left turns (protected when green, permissive when orange).
    pub left_light: Light,
}

impl DirectionLights {
    pub const RED: DirectionLights = DirectionLights {
        main_light: Light::Red,
        left_light: Light::Red,
    };

    pub const GO: DirectionLights = DirectionLights {
        main_light: Light::Green,
        left_light: Light::Orange,
    };

    pub fn is_all_red(&self) -> bool {
        self.main_light == Light::Red && self.left_light == Light::Red
    }
}

/// Snapshot of the whole intersection. Only the transition engine writes to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionState {
    phase: Phase,
    north: DirectionLights,
    south: DirectionLights,
    east: DirectionLights,
    west: DirectionLights,
}

impl Default for IntersectionState {
    /// North-South straight, permissive left, East-West held at red.
    fn default() -> Self {
        Self::serving(Axis::NorthSouth)
    }
}

impl IntersectionState {
    /// A settled straight phase for `axis`: green/orange there, all red across.
    pub fn serving(axis: Axis) -> Self {
        let mut state = Self {
            phase: axis.straight_phase(),
            north: DirectionLights::RED,
            south: DirectionLights::RED,
            east: DirectionLights::RED,
            west: DirectionLights::RED,
        };
        state.set_axis(axis, Light::Green, Light::Orange);
        state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn lights(&self, direction: Direction) -> DirectionLights {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    fn lights_mut(&mut self, direction: Direction) -> &mut DirectionLights {
        match direction {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_axis(&mut self, axis: Axis, main_light: Light, left_light: Light) {
        for direction in axis.directions() {
            *self.lights_mut(direction) = DirectionLights {
                main_light,
                left_light,
            };
        }
    }

    pub(crate) fn set_axis_left(&mut self, axis: Axis, left_light: Light) {
        for direction in axis.directions() {
            self.lights_mut(direction).left_light = left_light;
        }
    }

    /// True when at most one axis has a non-red main light and nothing outside the
    /// phase's axis shows anything but red.
    pub fn is_consistent(&self) -> bool {
        let serving = self.phase.axis();
        let crossing_all_red = serving
            .opposite()
            .directions()
            .iter()
            .all(|d| self.lights(*d).is_all_red());
        let axes_moving = [Axis::NorthSouth, Axis::EastWest]
            .iter()
            .filter(|axis| {
                axis.directions()
                    .iter()
                    .any(|d| self.lights(*d).main_light != Light::Red)
            })
            .count();
        crossing_all_red && axes_moving <= 1
    }
}

impl fmt::Display for IntersectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Phase: {}", self.phase)?;
        for direction in Direction::ALL {
            let lights = self.lights(direction);
            writeln!(
                f,
                "  {}  main={:<6} left={}",
                direction, lights.main_light, lights.left_light
            )?;
        }
        Ok(())
    }
}
