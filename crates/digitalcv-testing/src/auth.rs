//! Mock identity helpers for router tests.
//!
//! Services receive `x-digitalcv-user-id` + `x-digitalcv-user-role` headers
//! from the identity gateway. In tests, `MockAuth` builds these headers
//! directly so no real identity provider is needed.

use digitalcv_auth_types::identity::{ADMIN_ROLE, USER_ID_HEADER, USER_ROLE_HEADER};
use http::{HeaderName, HeaderValue};
use uuid::Uuid;

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub user_role: u8,
}

impl MockAuth {
    pub fn new(user_id: Uuid, user_role: u8) -> Self {
        Self { user_id, user_role }
    }

    pub fn user(user_id: Uuid) -> Self {
        Self::new(user_id, 0)
    }

    pub fn admin() -> Self {
        Self::new(Uuid::new_v4(), ADMIN_ROLE)
    }

    /// Header pairs as if the gateway injected them.
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        vec![
            (
                HeaderName::from_static(USER_ID_HEADER),
                HeaderValue::from_str(&self.user_id.to_string()).unwrap(),
            ),
            (
                HeaderName::from_static(USER_ROLE_HEADER),
                HeaderValue::from(u16::from(self.user_role)),
            ),
        ]
    }
}
