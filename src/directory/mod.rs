//! Directory API core and backends
//!
//! The backend-neutral pieces (identifiers, token cache, retry, transport,
//! pagination, tree building and the recursive walker) live at this level;
//! `feishu` and `wechat` wire them to each vendor's contact API.

pub mod feishu;
pub mod identifier;
pub mod paging;
pub mod retry;
pub mod token;
pub mod transport;
pub mod tree;
pub mod walker;
pub mod wechat;

pub use identifier::{IdKind, IdSelectors, Identifier};
pub use tree::{attach_user, build_tree, build_tree_by, DepartmentNode, TreeRecord};
pub use walker::{DirectorySource, WalkOptions, WalkOutcome, Walker};
