use crate::{error::Error, schema::Id};

/// The caller of an operation, passed explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Identity {
    Anonymous,
    User(Id),
}

impl Identity {
    pub fn user_id(&self) -> Option<Id> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(*id),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Identity::Anonymous => Role::Anonymous,
            Identity::User(_) => Role::User,
        }
    }

    /// Checks the action against the role table and returns the caller's id.
    pub fn authenticate(&self, action: ActionType) -> Result<Id, Error> {
        match self.user_id() {
            Some(id) if action.authenticate(self.role()) => Ok(id),
            Some(_) => Err(Error::Forbidden(String::from(
                "You don't have permission to perform this action",
            ))),
            None => Err(Error::Unauthorized),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Anonymous,
    User,
}

const ACTION_TABLE: &[(Role, &[ActionType])] = &[
    (Role::Anonymous, &[ActionType::ReadRecipes]),
    (
        Role::User,
        &[
            ActionType::ReadRecipes,
            ActionType::CreateRecipes,
            ActionType::ManageOwnRecipes,
            ActionType::ManageOwnFavorites,
            ActionType::ManageOwnShoppingCart,
            ActionType::ManageSubscriptions,
        ],
    ),
];

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionType {
    ReadRecipes,
    CreateRecipes,

    ManageOwnRecipes,
    ManageOwnFavorites,
    ManageOwnShoppingCart,
    ManageSubscriptions,
}

impl ActionType {
    pub fn authenticate(self, role: Role) -> bool {
        ACTION_TABLE
            .iter()
            .find_map(|(r, actions)| {
                if *r != role {
                    return None;
                }

                Some(actions.contains(&self))
            })
            .unwrap_or(false)
    }
}
