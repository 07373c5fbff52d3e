/* 📖 # What does efx_util contain?
efx_util layers the everyday helpers on top of efx_base: an event manager,
the leveled logger, string, collection and time helpers, process utilities and
zip/unzip through installed archivers.
*/

pub mod archive;
pub mod collect;
pub mod event;
pub mod log;
pub mod strings;
pub mod time;
pub mod utility;

pub use event::{Callback, EventId, EventManager, ListenerHandle};
pub use log::{LevelType, Logger};
