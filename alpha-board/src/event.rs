//! Board event handler.
//!
//! The operating system reports boot progress and fatal faults to the board.
//! The handler never blocks and may be called from fault context.

/// Event number of a fatal fault in privileged mode.
pub const EVENT_PRIV_FATAL: u32 = 0;
/// Event number signalling that the link is starting.
pub const EVENT_START_LINK: u32 = 1;
/// Event number signalling that the file systems are started.
///
/// The argument is the number of started applications.
pub const EVENT_START_FILESYSTEM: u32 = 2;

/// Event reported by the operating system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardEvent {
    /// Fatal fault in privileged mode.
    PrivFatal,
    /// Link is starting.
    StartLink,
    /// File systems are started.
    StartFilesystem {
        /// Number of started applications.
        apps: u32,
    },
    /// Event not handled by the board.
    Other(u32),
}

impl BoardEvent {
    /// Decodes an event number and its optional argument.
    ///
    /// A missing application count decodes as zero.
    pub const fn from_raw(code: u32, arg: Option<u32>) -> Self {
        match code {
            EVENT_PRIV_FATAL => Self::PrivFatal,
            EVENT_START_LINK => Self::StartLink,
            EVENT_START_FILESYSTEM => Self::StartFilesystem {
                apps: match arg {
                    Some(apps) => apps,
                    None => 0,
                },
            },
            other => Self::Other(other),
        }
    }

    /// Event number.
    pub const fn code(&self) -> u32 {
        match self {
            Self::PrivFatal => EVENT_PRIV_FATAL,
            Self::StartLink => EVENT_START_LINK,
            Self::StartFilesystem { .. } => EVENT_START_FILESYSTEM,
            Self::Other(code) => *code,
        }
    }
}

/// Board hardware actions triggered by events.
pub trait BoardHooks {
    /// Starts the bootloader.
    fn invoke_bootloader(&mut self) -> !;

    /// Indicates startup on the status LED.
    fn led_startup(&mut self);
}

/// Boot progress as seen by the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardState {
    /// Booting.
    #[default]
    Init,
    /// Link is started.
    LinkStarted,
    /// File systems and applications are started.
    Running {
        /// Number of started applications.
        apps: u32,
    },
}

/// Handles events reported by the operating system.
#[derive(Debug)]
pub struct EventHandler<H> {
    hooks: H,
    state: BoardState,
}

impl<H: BoardHooks> EventHandler<H> {
    /// Creates an event handler in the initial state.
    pub const fn new(hooks: H) -> Self {
        Self { hooks, state: BoardState::Init }
    }

    /// Handles an event and returns the new state.
    ///
    /// A fatal fault starts the bootloader and never returns.
    pub fn handle(&mut self, event: BoardEvent) -> BoardState {
        match event {
            BoardEvent::PrivFatal => {
                error!("fatal fault, starting bootloader");
                self.hooks.invoke_bootloader()
            }
            BoardEvent::StartLink => {
                debug!("start LED");
                self.hooks.led_startup();
                self.state = BoardState::LinkStarted;
            }
            BoardEvent::StartFilesystem { apps } => {
                info!("started {} apps", apps);
                self.state = BoardState::Running { apps };
            }
            BoardEvent::Other(code) => {
                trace!("ignoring event {}", code);
            }
        }
        self.state
    }

    /// Decodes and handles a raw event.
    pub fn handle_raw(&mut self, code: u32, arg: Option<u32>) -> BoardState {
        self.handle(BoardEvent::from_raw(code, arg))
    }

    /// Current state.
    pub fn state(&self) -> BoardState {
        self.state
    }

    /// Hooks.
    pub fn hooks(&mut self) -> &mut H {
        &mut self.hooks
    }
}
