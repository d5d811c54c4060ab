/// Neighbor offsets in clockwise order, starting east.
pub const DIRECTIONS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const NORTH: u8 = 6;
const LOOK_BACK: u8 = 6;

/// Probe direction register of the Moore tracer, an index into [`DIRECTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Compass(u8);

impl Compass {
    pub fn new(direction: u8) -> Self {
        Self(direction % 8)
    }

    /// Register used for the very first probe around the start pixel.
    pub fn start() -> Self {
        Self(NORTH)
    }

    pub fn direction(self) -> u8 {
        self.0
    }

    pub fn offset(self) -> (isize, isize) {
        DIRECTIONS[self.0 as usize]
    }

    pub fn rotate(self, steps: u8) -> Self {
        Self((self.0 + steps % 8) % 8)
    }

    /// Register for the search after a move in this direction: six steps
    /// forward, i.e. two steps back.
    pub fn look_back(self) -> Self {
        self.rotate(LOOK_BACK)
    }
}

impl Default for Compass {
    fn default() -> Self {
        Self::start()
    }
}
