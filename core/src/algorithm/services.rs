//! Per-algorithm service registry
//!
//! Services are created on first request and keyed by type. An algorithm
//! that hosts sub-computations hands them its registry so that they share
//! one cancellation counter.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::algorithm::cancellation::CancelManager;

#[derive(Default)]
pub struct ServiceRegistry {
    services: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the service of type `S`, creating it with `Default` if absent
    pub fn get_or_create<S>(&self) -> Arc<S>
    where
        S: Any + Send + Sync + Default,
    {
        let mut services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = services
            .entry(TypeId::of::<S>())
            .or_insert_with(|| Arc::new(S::default()));

        match Arc::clone(entry).downcast::<S>() {
            Ok(service) => service,
            Err(_) => {
                let service = Arc::new(S::default());
                *entry = service.clone();
                service
            }
        }
    }

    /// Returns the service of type `S` if one was created
    pub fn get<S>(&self) -> Option<Arc<S>>
    where
        S: Any + Send + Sync,
    {
        let services = self.services.lock().unwrap_or_else(PoisonError::into_inner);
        services
            .get(&TypeId::of::<S>())
            .and_then(|service| Arc::clone(service).downcast::<S>().ok())
    }

    pub fn cancel_manager(&self) -> Arc<CancelManager> {
        self.get_or_create::<CancelManager>()
    }

    pub fn len(&self) -> usize {
        self.services.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.len())
            .finish()
    }
}
