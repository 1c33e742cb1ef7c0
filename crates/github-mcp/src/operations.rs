//! The operation table
//!
//! Every exposed tool is declared once in [`OPERATIONS`]: name, description,
//! argument schema and the [`OperationKind`] the dispatcher matches on.
//! [`OperationTable`] indexes that array by name at startup and is never
//! mutated afterwards, so it can be shared freely between in-flight calls.

use std::collections::HashMap;

use crate::schema::{Field, FieldType, Schema};

/// Which upstream call a tool maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateRepository,
    CreateIssue,
    CreateOrUpdateFile,
    GetFileContents,
    CreatePullRequest,
    ForkRepository,
}

/// One exposed tool
#[derive(Debug)]
pub struct Operation {
    pub kind: OperationKind,
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Schema,
}

const OWNER: Field = Field::required(
    "owner",
    FieldType::String,
    "Repository owner (username or organization)",
);
const REPO: Field = Field::required("repo", FieldType::String, "Repository name");

const CREATE_REPOSITORY_FIELDS: &[Field] = &[
    Field::required("name", FieldType::String, "Repository name"),
    Field::optional("description", FieldType::String, "Repository description"),
    Field::optional("private", FieldType::Boolean, "Whether the repository should be private"),
    Field::optional("autoInit", FieldType::Boolean, "Initialize with README.md"),
];

const CREATE_ISSUE_FIELDS: &[Field] = &[
    OWNER,
    REPO,
    Field::required("title", FieldType::String, "Issue title"),
    Field::optional("body", FieldType::String, "Issue body"),
    Field::optional("assignees", FieldType::StringArray, "Usernames to assign"),
    Field::optional("milestone", FieldType::Integer, "Milestone number"),
    Field::optional("labels", FieldType::StringArray, "Labels to apply"),
];

const CREATE_OR_UPDATE_FILE_FIELDS: &[Field] = &[
    OWNER,
    REPO,
    Field::required("path", FieldType::String, "Path where to create/update the file"),
    Field::required("content", FieldType::String, "Content of the file"),
    Field::required("message", FieldType::String, "Commit message"),
    Field::required("branch", FieldType::String, "Branch to create/update the file in"),
    Field::optional(
        "sha",
        FieldType::String,
        "SHA of the file being replaced (required when updating existing files)",
    ),
];

const GET_FILE_CONTENTS_FIELDS: &[Field] = &[
    OWNER,
    REPO,
    Field::required("path", FieldType::String, "Path to the file or directory"),
    Field::optional("branch", FieldType::String, "Branch to get contents from"),
];

const CREATE_PULL_REQUEST_FIELDS: &[Field] = &[
    OWNER,
    REPO,
    Field::required("title", FieldType::String, "Pull request title"),
    Field::optional("body", FieldType::String, "Pull request body/description"),
    Field::required(
        "head",
        FieldType::String,
        "The name of the branch where your changes are implemented",
    ),
    Field::required(
        "base",
        FieldType::String,
        "The name of the branch you want the changes pulled into",
    ),
    Field::optional("draft", FieldType::Boolean, "Whether to create the pull request as a draft"),
    Field::optional(
        "maintainer_can_modify",
        FieldType::Boolean,
        "Whether maintainers can modify the pull request",
    ),
];

const FORK_REPOSITORY_FIELDS: &[Field] = &[
    OWNER,
    REPO,
    Field::optional(
        "organization",
        FieldType::String,
        "Optional: organization to fork to (defaults to your personal account)",
    ),
];

/// Declaration order is discovery order.
pub static OPERATIONS: [Operation; 6] = [
    Operation {
        kind: OperationKind::CreateOrUpdateFile,
        name: "create_or_update_file",
        description: "Create or update a single file in a GitHub repository",
        schema: Schema::new(CREATE_OR_UPDATE_FILE_FIELDS),
    },
    Operation {
        kind: OperationKind::CreateRepository,
        name: "create_repository",
        description: "Create a new GitHub repository in your account",
        schema: Schema::new(CREATE_REPOSITORY_FIELDS),
    },
    Operation {
        kind: OperationKind::GetFileContents,
        name: "get_file_contents",
        description: "Get the contents of a file or directory from a GitHub repository",
        schema: Schema::new(GET_FILE_CONTENTS_FIELDS),
    },
    Operation {
        kind: OperationKind::CreateIssue,
        name: "create_issue",
        description: "Create a new issue in a GitHub repository",
        schema: Schema::new(CREATE_ISSUE_FIELDS),
    },
    Operation {
        kind: OperationKind::CreatePullRequest,
        name: "create_pull_request",
        description: "Create a new pull request in a GitHub repository",
        schema: Schema::new(CREATE_PULL_REQUEST_FIELDS),
    },
    Operation {
        kind: OperationKind::ForkRepository,
        name: "fork_repository",
        description: "Fork a GitHub repository to your account or specified organization",
        schema: Schema::new(FORK_REPOSITORY_FIELDS),
    },
];

/// Name-indexed view over a static operation list
#[derive(Debug, Clone)]
pub struct OperationTable {
    operations: &'static [Operation],
    index: HashMap<&'static str, usize>,
}

impl Default for OperationTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationTable {
    /// Index the built-in [`OPERATIONS`].
    pub fn new() -> Self {
        Self::from_static(&OPERATIONS)
    }

    /// Index an arbitrary static list.
    ///
    /// Names must be unique. Debug builds panic on a duplicate; otherwise the
    /// last entry with a name wins and earlier ones are unreachable by lookup.
    pub fn from_static(operations: &'static [Operation]) -> Self {
        let mut index = HashMap::with_capacity(operations.len());
        for (position, operation) in operations.iter().enumerate() {
            let previous = index.insert(operation.name, position);
            debug_assert!(previous.is_none(), "duplicate operation name: {}", operation.name);
        }
        Self { operations, index }
    }

    pub fn get(&self, name: &str) -> Option<&'static Operation> {
        let operations: &'static [Operation] = self.operations;
        self.index.get(name).map(|&position| &operations[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Operations in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &'static Operation> {
        let operations: &'static [Operation] = self.operations;
        operations.iter()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
