use core::fmt;
use spin::Mutex;

/// Most components the board tracks. Registering more is ignored.
pub const MAX_COMPONENTS: usize = 8;

/// Kernel initialization status tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed(&'static str),
}

/// Kernel component status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStatus {
    pub name: &'static str,
    pub status: InitStatus,
}

impl ComponentStatus {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            status: InitStatus::NotStarted,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, InitStatus::Completed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, InitStatus::Failed(_))
    }
}

/// Fixed-capacity list of components, in registration order.
pub struct StatusBoard {
    slots: [Option<ComponentStatus>; MAX_COMPONENTS],
}

impl StatusBoard {
    pub const fn new() -> Self {
        Self {
            slots: [None; MAX_COMPONENTS],
        }
    }

    pub fn register(&mut self, name: &'static str) -> bool {
        if self.iter().any(|c| c.name == name) {
            return true;
        }
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(ComponentStatus::new(name));
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, name: &'static str, status: InitStatus) {
        if let Some(comp) = self.slots.iter_mut().flatten().find(|c| c.name == name) {
            comp.status = status;
        }
    }

    pub fn get(&self, name: &str) -> Option<ComponentStatus> {
        self.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = ComponentStatus> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn all_ready(&self) -> bool {
        let mut components = self.iter().peekable();
        components.peek().is_some() && components.all(|c| c.is_complete())
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

static INIT_STATUS: Mutex<StatusBoard> = Mutex::new(StatusBoard::new());

/// Track kernel component initialization
pub fn register_component(name: &'static str) {
    INIT_STATUS.lock().register(name);
}

/// Update component status
pub fn update_component_status(name: &'static str, status: InitStatus) {
    INIT_STATUS.lock().update(name, status);
}

/// Copy of every registered component, in registration order
pub fn get_all_statuses() -> [Option<ComponentStatus>; MAX_COMPONENTS] {
    INIT_STATUS.lock().slots
}

/// Check if all components are initialized
pub fn all_components_ready() -> bool {
    INIT_STATUS.lock().all_ready()
}

impl fmt::Display for InitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitStatus::NotStarted => write!(f, "Not Started"),
            InitStatus::InProgress => write!(f, "In Progress"),
            InitStatus::Completed => write!(f, "Completed"),
            InitStatus::Failed(err) => write!(f, "Failed: {}", err),
        }
    }
}
