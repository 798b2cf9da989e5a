//! Connection registry: at most one live connection per user.

use std::fmt;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use staffhub_core::types::{ConnectionId, Role, UserId};

use super::handle::Connection;

/// Storage for live connections.
///
/// Implementations must be safe under concurrent register, unregister and
/// snapshot calls, and a snapshot must be taken as a copy so iteration never
/// races a concurrent mutation.
pub trait ConnectionStore: Send + Sync + fmt::Debug {
    /// Insert the user's connection, returning the one it replaced.
    fn register(&self, connection: Connection) -> Option<Connection>;

    /// Remove whatever connection the user has. Absent users are a no-op.
    fn unregister(&self, user_id: &UserId) -> Option<Connection>;

    /// Remove the user's connection only if it is still `connection_id`.
    ///
    /// Used when a stream closes, so that a connection that was already
    /// replaced does not remove its successor.
    fn unregister_connection(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Connection>;

    /// The user's current connection.
    fn get(&self, user_id: &UserId) -> Option<Connection>;

    /// Copy of the current connections, optionally restricted to the given
    /// roles. `Some(&[])` matches nobody.
    fn snapshot(&self, roles: Option<&[Role]>) -> Vec<Connection>;

    /// Number of connected users.
    fn len(&self) -> usize;

    /// Whether nobody is connected.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove and return every connection.
    fn drain(&self) -> Vec<Connection>;

    /// Remove every connection and close its channel. Returns how many were
    /// closed.
    fn close_all(&self) -> usize {
        let drained = self.drain();
        for connection in &drained {
            connection.close();
        }
        drained.len()
    }
}

/// Process-local [`ConnectionStore`] backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    by_user: DashMap<UserId, Connection>,
}

impl InMemoryRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConnectionStore for InMemoryRegistry {
    fn register(&self, connection: Connection) -> Option<Connection> {
        self.by_user.insert(connection.user_id, connection)
    }

    fn unregister(&self, user_id: &UserId) -> Option<Connection> {
        self.by_user.remove(user_id).map(|(_, conn)| conn)
    }

    fn unregister_connection(
        &self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Option<Connection> {
        match self.by_user.entry(*user_id) {
            Entry::Occupied(entry) if entry.get().id == *connection_id => Some(entry.remove()),
            _ => None,
        }
    }

    fn get(&self, user_id: &UserId) -> Option<Connection> {
        self.by_user.get(user_id).map(|entry| entry.value().clone())
    }

    fn snapshot(&self, roles: Option<&[Role]>) -> Vec<Connection> {
        self.by_user
            .iter()
            .filter(|entry| roles.is_none_or(|roles| roles.contains(&entry.value().role)))
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.by_user.len()
    }

    fn drain(&self) -> Vec<Connection> {
        let users: Vec<UserId> = self.by_user.iter().map(|entry| *entry.key()).collect();
        users
            .iter()
            .filter_map(|user_id| self.unregister(user_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::connection::outbound::{OutboundReceiver, outbound_channel};

    fn connection(user_id: UserId, role: Role) -> (Connection, OutboundReceiver) {
        let (tx, rx) = outbound_channel(4);
        (Connection::new(user_id, role, "tester", Arc::new(tx)), rx)
    }

    #[test]
    fn test_register_replaces_previous_connection() {
        let registry = InMemoryRegistry::new();
        let user = UserId::new();
        let (first, _rx1) = connection(user, Role::employee());
        let (second, _rx2) = connection(user, Role::employee());
        let first_id = first.id;

        assert!(registry.register(first).is_none());
        let replaced = registry.register(second.clone()).expect("replaced");
        assert_eq!(replaced.id, first_id);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&user).unwrap().id, second.id);
    }

    #[test]
    fn test_unregister_absent_user_is_noop() {
        let registry = InMemoryRegistry::new();
        assert!(registry.unregister(&UserId::new()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_stale_close_keeps_successor() {
        let registry = InMemoryRegistry::new();
        let user = UserId::new();
        let (first, _rx1) = connection(user, Role::manager());
        let (second, _rx2) = connection(user, Role::manager());
        let first_id = first.id;
        let second_id = second.id;
        registry.register(first);
        registry.register(second);

        assert!(registry.unregister_connection(&user, &first_id).is_none());
        assert_eq!(registry.get(&user).unwrap().id, second_id);
        assert!(registry.unregister_connection(&user, &second_id).is_some());
        assert!(registry.get(&user).is_none());
    }

    #[test]
    fn test_snapshot_filters_by_role() {
        let registry = InMemoryRegistry::new();
        let (admin, _a) = connection(UserId::new(), Role::admin());
        let (manager, _m) = connection(UserId::new(), Role::manager());
        let (employee, _e) = connection(UserId::new(), Role::employee());
        registry.register(admin);
        registry.register(manager);
        registry.register(employee);

        assert_eq!(registry.snapshot(None).len(), 3);
        let leads = registry.snapshot(Some(&[Role::admin(), Role::manager()]));
        assert_eq!(leads.len(), 2);
        assert!(leads.iter().all(|c| c.role.is_manager_or_above()));
        assert!(registry.snapshot(Some(&[])).is_empty());
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let registry = InMemoryRegistry::new();
        let user = UserId::new();
        let (conn, _rx) = connection(user, Role::employee());
        registry.register(conn);

        let snapshot = registry.snapshot(None);
        registry.unregister(&user);
        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_close_all_empties_and_closes() {
        let registry = InMemoryRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (conn, rx) = connection(UserId::new(), Role::employee());
            registry.register(conn);
            receivers.push(rx);
        }
        let snapshot = registry.snapshot(None);
        assert_eq!(registry.close_all(), 3);
        assert!(registry.is_empty());
        assert!(snapshot.iter().all(Connection::is_closed));
    }
}
