//! Stone values: colour, accumulated points and a render hint.

use rand::Rng;

/// Colours a stone can take. `Empty` marks a cleared slot; `Merged` is never spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoneColor {
    Green,
    Grey,
    Yellow,
    Merged,
    Empty,
}

impl StoneColor {
    /// Colours drawn for new stones (initial grid and refill).
    pub const SPAWNABLE: [Self; 3] = [Self::Green, Self::Grey, Self::Yellow];

    /// Uniform draw over [0, 1): `<= 0.3` green, `(0.3, 0.6]` grey, otherwise yellow.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_unit(rng.random::<f64>())
    }

    /// Maps a value in [0, 1) onto the spawn ranges.
    pub fn from_unit(u: f64) -> Self {
        if u <= 0.3 {
            Self::Green
        } else if u <= 0.6 {
            Self::Grey
        } else {
            Self::Yellow
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    /// Layout character used by `Grid`'s text form.
    pub fn symbol(self) -> char {
        match self {
            Self::Green => 'g',
            Self::Grey => 's',
            Self::Yellow => 'y',
            Self::Merged => 'm',
            Self::Empty => '.',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'g' => Some(Self::Green),
            's' => Some(Self::Grey),
            'y' => Some(Self::Yellow),
            'm' => Some(Self::Merged),
            '.' => Some(Self::Empty),
            _ => None,
        }
    }
}

/// How the front-end should introduce a stone on the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Idle,
    Spawning,
    Falling,
}

/// One grid slot. Replaced wholesale when logic moves or clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub color: StoneColor,
    pub points: u32,
    pub state: DisplayState,
}

impl Cell {
    pub const EMPTY: Self = Self {
        color: StoneColor::Empty,
        points: 1,
        state: DisplayState::Idle,
    };

    pub const fn stone(color: StoneColor) -> Self {
        Self {
            color,
            points: 1,
            state: DisplayState::Idle,
        }
    }

    /// Fresh single-point stone marked for the spawn animation.
    pub fn spawned<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            color: StoneColor::random(rng),
            points: 1,
            state: DisplayState::Spawning,
        }
    }

    /// Merged stone pinned at `threshold`.
    pub const fn merged(threshold: u32) -> Self {
        Self {
            color: StoneColor::Merged,
            points: threshold,
            state: DisplayState::Idle,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.color.is_empty()
    }

    /// A merged stone carries exactly the threshold.
    #[inline]
    pub fn is_merged(&self, threshold: u32) -> bool {
        !self.is_empty() && self.points == threshold
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}
