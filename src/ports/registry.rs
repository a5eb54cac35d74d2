// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service-registry port consuming the wiring plan.
//!
//! This is the boundary to the external instantiation collaborator (a
//! dependency-injection builder or similar). The plan stays a pure
//! value; whatever constructs live objects out of it implements this
//! trait and receives the entries one by one, in plan order.

use crate::domain::errors::Result;
use crate::domain::plan::ServiceEntry;

/// Receiver of wiring-plan entries.
///
/// Each entry carries the service identifier, the implementation
/// selector with its resolved configuration, dependency edges, the
/// autowire-visibility flag, tags, and post-construction setup calls.
///
/// # Examples
///
/// ```rust
/// use rediswire::domain::errors::Result;
/// use rediswire::domain::plan::ServiceEntry;
/// use rediswire::ports::ServiceRegistry;
///
/// struct PrintingRegistry;
///
/// impl ServiceRegistry for PrintingRegistry {
///     fn register(&mut self, entry: &ServiceEntry) -> Result<()> {
///         println!("would build {}", entry.id);
///         Ok(())
///     }
/// }
/// ```
pub trait ServiceRegistry {
    /// Registers one service entry.
    ///
    /// Returning an error aborts [`WiringPlan::apply`] and with it the
    /// whole configuration load.
    ///
    /// [`WiringPlan::apply`]: crate::domain::plan::WiringPlan::apply
    fn register(&mut self, entry: &ServiceEntry) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{ServiceId, ServiceKind};

    struct CountingRegistry {
        count: usize,
    }

    impl ServiceRegistry for CountingRegistry {
        fn register(&mut self, _entry: &ServiceEntry) -> Result<()> {
            self.count += 1;
            Ok(())
        }
    }

    #[test]
    fn test_registry_receives_entries() {
        let entry = ServiceEntry {
            id: ServiceId::from("redis.driver"),
            kind: ServiceKind::Driver {
                implementation: crate::domain::plan::DriverImpl::available(),
            },
            depends_on: Vec::new(),
            autowired: true,
            tags: Vec::new(),
            setup: Vec::new(),
        };
        let mut registry = CountingRegistry { count: 0 };
        registry.register(&entry).unwrap();
        assert_eq!(registry.count, 1);
    }
}
