//! Movement and scroll key identities, and the flags recording which are held.
//!
//! The set of identities is fixed: four pointer directions and four scroll
//! directions.  Which physical key maps to which identity comes from the
//! keybind configuration; this module only knows the identities.

/// One of the eight fixed movement/scroll keybind identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKey {
    MouseUp,
    MouseLeft,
    MouseDown,
    MouseRight,
    ScrollUp,
    ScrollLeft,
    ScrollDown,
    ScrollRight,
}

impl MotionKey {
    /// All identities, in the order the movement engine checks them.
    pub const ALL: [MotionKey; 8] = [
        MotionKey::MouseUp,
        MotionKey::MouseLeft,
        MotionKey::MouseDown,
        MotionKey::MouseRight,
        MotionKey::ScrollUp,
        MotionKey::ScrollLeft,
        MotionKey::ScrollDown,
        MotionKey::ScrollRight,
    ];

    fn index(self) -> usize {
        match self {
            MotionKey::MouseUp => 0,
            MotionKey::MouseLeft => 1,
            MotionKey::MouseDown => 2,
            MotionKey::MouseRight => 3,
            MotionKey::ScrollUp => 4,
            MotionKey::ScrollLeft => 5,
            MotionKey::ScrollDown => 6,
            MotionKey::ScrollRight => 7,
        }
    }

    /// The fixed-magnitude motion produced by one tick of this key.
    ///
    /// Positive wheel amounts scroll up (vertical) or right (horizontal),
    /// matching the sign convention of `REL_WHEEL` / `REL_HWHEEL`.
    pub fn motion(self, mouse_speed: i32, scroll_speed: i32) -> Motion {
        match self {
            MotionKey::MouseUp => Motion::Pointer { dx: 0, dy: -mouse_speed },
            MotionKey::MouseLeft => Motion::Pointer { dx: -mouse_speed, dy: 0 },
            MotionKey::MouseDown => Motion::Pointer { dx: 0, dy: mouse_speed },
            MotionKey::MouseRight => Motion::Pointer { dx: mouse_speed, dy: 0 },
            MotionKey::ScrollUp => Motion::Wheel { axis: WheelAxis::Vertical, amount: scroll_speed },
            MotionKey::ScrollLeft => Motion::Wheel { axis: WheelAxis::Horizontal, amount: -scroll_speed },
            MotionKey::ScrollDown => Motion::Wheel { axis: WheelAxis::Vertical, amount: -scroll_speed },
            MotionKey::ScrollRight => Motion::Wheel { axis: WheelAxis::Horizontal, amount: scroll_speed },
        }
    }
}

/// Scroll wheel axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelAxis {
    Vertical,
    Horizontal,
}

/// A single relative motion to emit on the virtual mouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Pointer { dx: i32, dy: i32 },
    Wheel { axis: WheelAxis, amount: i32 },
}

/// "Currently pressed" flag for each of the eight [`MotionKey`]s.
///
/// The key set is fixed by construction; only the flag values change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeySet {
    flags: [bool; 8],
}

impl HeldKeySet {
    /// Creates a set with every flag cleared.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag for `key`. Returns `true` if the value changed.
    pub fn set(&mut self, key: MotionKey, held: bool) -> bool {
        let slot = &mut self.flags[key.index()];
        let changed = *slot != held;
        *slot = held;
        changed
    }

    /// Returns whether `key` is currently held.
    pub fn is_held(&self, key: MotionKey) -> bool {
        self.flags[key.index()]
    }

    /// Clears every flag.
    pub fn clear(&mut self) {
        self.flags = [false; 8];
    }

    /// Returns `true` if any flag is set.
    pub fn any(&self) -> bool {
        self.flags.iter().any(|held| *held)
    }

    /// Iterates the held keys in [`MotionKey::ALL`] order.
    pub fn held(&self) -> impl Iterator<Item = MotionKey> + '_ {
        MotionKey::ALL.into_iter().filter(|key| self.is_held(*key))
    }
}
