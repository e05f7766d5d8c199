//! Domain model: entities, the contribution calculator, the turn-order manager
//! and the ports to the outside world.

pub mod group;
pub mod member;
pub mod money;
pub mod payment;
pub mod ports;
pub mod round;
pub mod schedule;
pub mod turn_order;
