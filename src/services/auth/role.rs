/// User classifier stored as a small integer on `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Auditor,
    Admin,
    Root,
}

impl Role {
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            0 => Some(Self::User),
            1 => Some(Self::Auditor),
            2 => Some(Self::Admin),
            3 => Some(Self::Root),
            _ => None,
        }
    }

    /// Policy lookup key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Auditor => "auditor",
            Self::Admin => "admin",
            Self::Root => "root",
        }
    }
}
