#[cfg(feature = "core")]
#[doc(inline)]
pub use regnet_core as core;

#[cfg(feature = "overlaprs")]
#[doc(inline)]
pub use regnet_overlaprs as overlaprs;

#[cfg(feature = "binding")]
#[doc(inline)]
pub use regnet_binding as binding;

#[cfg(feature = "network")]
#[doc(inline)]
pub use regnet_network as network;

#[cfg(feature = "influence")]
#[doc(inline)]
pub use regnet_influence as influence;
