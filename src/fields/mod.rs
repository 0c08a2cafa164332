//! Closed enumerations mapping wire integers to names.

pub mod block_type;
pub mod packet_type;
pub mod payload_type;
pub mod priority;
pub mod service_options;

pub use block_type::{BlockKind, BlockType, BlockTypeRegistry, registry};
pub use packet_type::PacketType;
pub use payload_type::PayloadType;
pub use priority::{
    ConsoleTransmissionRequestPriority, TransmissionDescriptor, TransmitPriorityType,
};
pub use service_options::ServiceOptions;
