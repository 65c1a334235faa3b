//! In-memory repository implementations
//!
//! Used when no backing store is attached and by the test suite. Durable
//! persistence of tenants, clients and minutes belongs to an external
//! collaborator.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::minute::{ClientRecord, ClientRepository, MeetingMinute, MinuteRepository};
use crate::domain::shared::Result;
use crate::domain::tenant::{Tenant, TenantDirectory};

/// In-memory tenant directory with a phone-number index
pub struct InMemoryTenantDirectory {
    tenants: Mutex<HashMap<String, Tenant>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self {
            tenants: Mutex::new(HashMap::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.tenants.lock().unwrap().len()
    }
}

impl Default for InMemoryTenantDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn get(&self, tenant_id: &str) -> Result<Option<Tenant>> {
        Ok(self.tenants.lock().unwrap().get(tenant_id).cloned())
    }

    async fn find_by_phone_number(&self, number: &str) -> Result<Option<Tenant>> {
        let tenants = self.tenants.lock().unwrap();
        Ok(tenants
            .values()
            .find(|tenant| tenant.phone_number.as_deref() == Some(number))
            .cloned())
    }

    async fn upsert(&self, tenant: Tenant) -> Result<()> {
        tenant.ai_config.validate()?;
        self.tenants.lock().unwrap().insert(tenant.id.clone(), tenant);
        Ok(())
    }
}

/// In-memory meeting minute store
pub struct InMemoryMinuteRepository {
    minutes: Mutex<Vec<MeetingMinute>>,
}

impl InMemoryMinuteRepository {
    pub fn new() -> Self {
        Self {
            minutes: Mutex::new(Vec::new()),
        }
    }

    pub fn all(&self) -> Vec<MeetingMinute> {
        self.minutes.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.minutes.lock().unwrap().len()
    }
}

impl Default for InMemoryMinuteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MinuteRepository for InMemoryMinuteRepository {
    async fn create(&self, minute: &MeetingMinute) -> Result<()> {
        self.minutes.lock().unwrap().push(minute.clone());
        Ok(())
    }
}

/// In-memory client store, matched by phone within a tenant
pub struct InMemoryClientRepository {
    clients: Mutex<Vec<ClientRecord>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, client: ClientRecord) {
        self.clients.lock().unwrap().push(client);
    }
}

impl Default for InMemoryClientRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn find_by_phone(&self, tenant_id: &str, phone: &str) -> Result<Option<ClientRecord>> {
        let clients = self.clients.lock().unwrap();
        Ok(clients
            .iter()
            .find(|client| client.tenant_id == tenant_id && client.phone == phone)
            .cloned())
    }
}
