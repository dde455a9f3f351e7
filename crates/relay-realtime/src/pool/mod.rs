//! Connection pool: membership and broadcast fan-out.
//!
//! [`Pool`] is the coordinator and runs on its own task; [`PoolHandle`] is
//! the cloneable submission side handed to every client.

pub mod coordinator;
pub mod handle;

pub use coordinator::Pool;
pub use handle::PoolHandle;
