//! Recursive department walk
//!
//! Starting from one or more root departments, the walker fetches each
//! department's detail, resolves its leader's name, loads its directly
//! assigned users and then descends into its children. The walk is
//! sequential and depth-first: a node's own fetches finish before any of
//! its children start, and siblings are visited left to right.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, info, warn};

use crate::config::fetch;
use crate::error::{OrgError, Result};

use super::identifier::{IdKind, IdSelectors, Identifier};
use super::retry::{retry, RetryPolicy};
use super::tree::DepartmentNode;

/// Fields the walker needs from a department record
pub trait WalkedDepartment {
    /// Department id in the requested id space
    fn department_id(&self, kind: IdKind) -> &str;
    fn display_name(&self) -> &str;
    /// Leader user id, in whichever user id space the record was fetched with
    fn leader_id(&self) -> Option<&str>;
}

/// Fields the walker needs from a user record
pub trait WalkedUser {
    fn display_name(&self) -> &str;
}

/// Backend calls the walker is built from
///
/// Each call takes the typed id it is about and the id space to use for the
/// other entity kind in the response.
pub trait DirectorySource {
    type Department: WalkedDepartment;
    type User: WalkedUser;

    fn department(
        &self,
        id: &Identifier,
        user_kind: IdKind,
    ) -> impl Future<Output = Result<Self::Department>>;

    fn user(
        &self,
        id: &Identifier,
        department_kind: IdKind,
    ) -> impl Future<Output = Result<Self::User>>;

    fn users_in(
        &self,
        department: &Identifier,
        user_kind: IdKind,
    ) -> impl Future<Output = Result<Vec<Self::User>>>;

    fn children_of(
        &self,
        department: &Identifier,
        user_kind: IdKind,
    ) -> impl Future<Output = Result<Vec<Self::Department>>>;
}

/// Node type produced by walking `S`
pub type WalkNode<S> =
    DepartmentNode<<S as DirectorySource>::Department, <S as DirectorySource>::User>;

/// Knobs for one walk
#[derive(Debug, Clone, Copy)]
pub struct WalkOptions {
    /// Applied to detail, leader, user and child listing calls
    pub retry: RetryPolicy,
    /// Pause before visiting each child department
    pub interval: Duration,
    /// Stop the whole walk at the first exhausted fetch. When false the
    /// failing department (or its users/children) is skipped and the walk
    /// continues with its siblings.
    pub abort_on_subtree_failure: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            interval: Duration::from_millis(fetch::INTERVAL_MS),
            abort_on_subtree_failure: true,
        }
    }
}

/// Which step of a department visit failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkStage {
    Department,
    Users,
    Children,
}

impl fmt::Display for WalkStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalkStage::Department => write!(f, "department detail"),
            WalkStage::Users => write!(f, "user list"),
            WalkStage::Children => write!(f, "child departments"),
        }
    }
}

/// A fetch that ran out of attempts
#[derive(Debug)]
pub struct WalkFailure {
    pub department: Identifier,
    pub stage: WalkStage,
    pub error: OrgError,
}

impl fmt::Display for WalkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for department {}: {}",
            self.stage, self.department, self.error
        )
    }
}

/// Result of a walk: whatever was assembled plus every exhausted fetch
#[derive(Debug)]
pub struct WalkOutcome<D, U> {
    pub forest: Vec<DepartmentNode<D, U>>,
    pub failures: Vec<WalkFailure>,
    /// The walk stopped early instead of visiting every requested root
    pub aborted: bool,
}

impl<D, U> WalkOutcome<D, U> {
    /// True when any fetch failed, so the forest is incomplete
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

enum Flow {
    Continue,
    Abort,
}

/// Depth-first walker over a [`DirectorySource`]
pub struct Walker<'a, S> {
    source: &'a S,
    ids: IdSelectors,
    options: WalkOptions,
    progress: Option<&'a dyn Fn(usize, &str)>,
}

impl<'a, S: DirectorySource> Walker<'a, S> {
    pub fn new(source: &'a S, ids: IdSelectors, options: WalkOptions) -> Self {
        Self {
            source,
            ids,
            options,
            progress: None,
        }
    }

    /// Called with the running department count and name after each visit
    pub fn with_progress(mut self, progress: &'a dyn Fn(usize, &str)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Walk every root in order.
    pub async fn walk(&self, roots: &[Identifier]) -> WalkOutcome<S::Department, S::User> {
        let mut state = WalkState::default();
        let mut forest = Vec::with_capacity(roots.len());
        let mut aborted = false;

        for root in roots {
            let (node, flow) = self.visit(root.clone(), String::new(), &mut state).await;
            if let Some(node) = node {
                forest.push(node);
            }
            if let Flow::Abort = flow {
                aborted = true;
                break;
            }
        }

        if aborted || !state.failures.is_empty() {
            warn!(
                "Walk finished with {} failed fetches, results are incomplete",
                state.failures.len()
            );
        } else {
            info!("Walk finished: {} departments", state.visited);
        }

        WalkOutcome {
            forest,
            failures: state.failures,
            aborted,
        }
    }

    fn fail(
        &self,
        state: &mut WalkState,
        id: &Identifier,
        stage: WalkStage,
        error: OrgError,
    ) -> Flow {
        // An operator interrupt always ends the walk
        let abort =
            self.options.abort_on_subtree_failure || matches!(error, OrgError::Cancelled);
        warn!("Failed to fetch {} for department {}: {}", stage, id, error);
        state.failures.push(WalkFailure {
            department: id.clone(),
            stage,
            error,
        });
        if abort {
            Flow::Abort
        } else {
            Flow::Continue
        }
    }

    fn visit<'s>(
        &'s self,
        id: Identifier,
        parent_name: String,
        state: &'s mut WalkState,
    ) -> LocalBoxFuture<'s, (Option<WalkNode<S>>, Flow)> {
        async move {
            let policy = self.options.retry;
            let user_kind = self.ids.user;

            let department = match retry(policy, "department detail", || {
                self.source.department(&id, user_kind)
            })
            .await
            {
                Ok(d) => d,
                Err(e) => {
                    let flow = self.fail(state, &id, WalkStage::Department, e);
                    return (None, flow);
                }
            };

            let mut node = DepartmentNode::new(department);
            node.parent_name = parent_name;

            if let Some(leader) = node.department.leader_id().filter(|l| !l.is_empty()) {
                let leader = Identifier::new(user_kind, leader);
                match retry(policy, "department leader", || {
                    self.source.user(&leader, self.ids.department)
                })
                .await
                {
                    Ok(user) => node.leader_name = user.display_name().to_string(),
                    Err(e) => debug!("Leader {} left unresolved: {}", leader, e),
                }
            }

            match retry(policy, "department users", || {
                self.source.users_in(&id, user_kind)
            })
            .await
            {
                Ok(users) => node.users = users,
                Err(e) => {
                    if let Flow::Abort = self.fail(state, &id, WalkStage::Users, e) {
                        return (None, Flow::Abort);
                    }
                }
            }

            state.visited += 1;
            if let Some(progress) = self.progress {
                progress(state.visited, node.department.display_name());
            }
            debug!(
                "Department {} ({}) has {} users",
                node.department.display_name(),
                id,
                node.users.len()
            );

            let children = match retry(policy, "child departments", || {
                self.source.children_of(&id, user_kind)
            })
            .await
            {
                Ok(children) => children,
                Err(e) => {
                    let flow = self.fail(state, &id, WalkStage::Children, e);
                    return (Some(node), flow);
                }
            };

            let name = node.department.display_name().to_string();
            for child in &children {
                let child_id = Identifier::new(
                    self.ids.department,
                    child.department_id(self.ids.department),
                );
                tokio::time::sleep(self.options.interval).await;
                let (child_node, flow) = self.visit(child_id, name.clone(), &mut *state).await;
                if let Some(child_node) = child_node {
                    node.children.push(child_node);
                }
                if let Flow::Abort = flow {
                    return (Some(node), Flow::Abort);
                }
            }

            (Some(node), Flow::Continue)
        }
        .boxed_local()
    }
}

#[derive(Default)]
struct WalkState {
    visited: usize,
    failures: Vec<WalkFailure>,
}


#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::testing::*;
    use super::*;
    use crate::directory::tree::{count_departments, count_users};

    fn options(abort: bool) -> WalkOptions {
        WalkOptions {
            retry: RetryPolicy::new(3, Duration::from_millis(1)),
            interval: Duration::ZERO,
            abort_on_subtree_failure: abort,
        }
    }

    fn org() -> FakeDirectory {
        let mut dir = FakeDirectory::default();
        dir.add_department("1", None, "Root");
        dir.add_department("2", Some("1"), "Eng");
        dir.add_department("3", Some("1"), "Sales");
        dir.add_department("4", Some("2"), "Infra");
        dir.add_member("1", "u-ceo", "Ceo");
        dir.add_member("2", "u-alice", "Alice");
        dir.add_member("3", "u-alice", "Alice");
        dir.add_member("4", "u-bob", "Bob");
        dir
    }

    fn names<D: WalkedDepartment, U>(nodes: &[DepartmentNode<D, U>]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| n.department.display_name().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_walk_builds_full_tree() {
        let dir = org();
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker.walk(&[Identifier::stable("1")]).await;

        assert!(!outcome.is_partial());
        assert!(!outcome.aborted);
        assert_eq!(names(&outcome.forest), vec!["Root"]);
        let root = &outcome.forest[0];
        assert_eq!(names(&root.children), vec!["Eng", "Sales"]);
        assert_eq!(names(&root.children[0].children), vec!["Infra"]);
        assert_eq!(root.children[0].parent_name, "Root");
        assert_eq!(count_departments(&outcome.forest), 4);
    }

    #[tokio::test]
    async fn test_user_in_two_departments_attached_to_both() {
        let dir = org();
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker.walk(&[Identifier::stable("1")]).await;

        let root = &outcome.forest[0];
        assert_eq!(root.children[0].users[0].name, "Alice");
        assert_eq!(root.children[1].users[0].name, "Alice");
        assert_eq!(count_users(&outcome.forest), 4);
    }

    #[tokio::test]
    async fn test_visits_node_before_children_and_siblings_in_order() {
        let dir = org();
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        walker.walk(&[Identifier::stable("1")]).await;

        let order: Vec<String> = dir
            .calls
            .borrow()
            .iter()
            .filter(|(op, _)| *op == "department")
            .map(|(_, id)| id.clone())
            .collect();
        assert_eq!(order, vec!["1", "2", "4", "3"]);
    }

    #[tokio::test]
    async fn test_scoped_ids_are_threaded_through() {
        let dir = org();
        let ids = IdSelectors::new(IdKind::Scoped, IdKind::Stable);
        let walker = Walker::new(&dir, ids, options(true));
        let outcome = walker.walk(&[Identifier::scoped("od-1")]).await;

        assert_eq!(count_departments(&outcome.forest), 4);
        assert_eq!(dir.call_count("department", "od-4"), 1);
        assert_eq!(dir.call_count("department", "4"), 0);
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let dir = org();
        dir.fail("department", "2", 2);
        dir.fail("users", "3", 2);
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker.walk(&[Identifier::stable("1")]).await;

        assert!(!outcome.is_partial());
        assert_eq!(count_departments(&outcome.forest), 4);
        assert_eq!(dir.call_count("department", "2"), 3);
        assert_eq!(dir.call_count("users", "3"), 3);
    }

    #[tokio::test]
    async fn test_child_failure_aborts_whole_walk() {
        let dir = org();
        dir.fail("department", "2", 3);
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker.walk(&[Identifier::stable("1")]).await;

        assert!(outcome.aborted);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].stage, WalkStage::Department);
        assert_eq!(dir.call_count("department", "2"), 3);
        // Root was already assembled and is kept; Sales is never visited
        assert_eq!(names(&outcome.forest), vec!["Root"]);
        assert!(outcome.forest[0].children.is_empty());
        assert_eq!(dir.call_count("department", "3"), 0);
    }

    #[tokio::test]
    async fn test_keep_going_skips_failed_subtree() {
        let dir = org();
        dir.fail("department", "2", 3);
        let walker = Walker::new(&dir, IdSelectors::default(), options(false));
        let outcome = walker.walk(&[Identifier::stable("1")]).await;

        assert!(!outcome.aborted);
        assert!(outcome.is_partial());
        assert_eq!(names(&outcome.forest[0].children), vec!["Sales"]);
    }

    #[tokio::test]
    async fn test_root_failure_stops_remaining_roots() {
        let mut dir = org();
        dir.add_department("9", None, "Other");
        dir.fail("users", "1", 3);
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker
            .walk(&[Identifier::stable("1"), Identifier::stable("9")])
            .await;

        assert!(outcome.aborted);
        assert!(outcome.forest.is_empty());
        assert_eq!(outcome.failures[0].stage, WalkStage::Users);
        assert_eq!(dir.call_count("department", "9"), 0);
    }

    #[tokio::test]
    async fn test_leader_failure_is_not_fatal() {
        let mut dir = org();
        if let Some(root) = dir.departments.get_mut("1") {
            root.leader = Some("u-ceo".to_string());
        }
        if let Some(eng) = dir.departments.get_mut("2") {
            eng.leader = Some("u-alice".to_string());
        }
        dir.fail("user", "u-alice", 3);
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker.walk(&[Identifier::stable("1")]).await;

        assert!(!outcome.is_partial());
        assert_eq!(outcome.forest[0].leader_name, "Ceo");
        assert_eq!(outcome.forest[0].children[0].leader_name, "");
        assert_eq!(dir.call_count("user", "u-alice"), 3);
    }

    #[tokio::test]
    async fn test_children_failure_keeps_node() {
        let dir = org();
        dir.fail("children", "2", 3);
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker.walk(&[Identifier::stable("1")]).await;

        assert!(outcome.aborted);
        let root = &outcome.forest[0];
        assert_eq!(names(&root.children), vec!["Eng"]);
        assert_eq!(root.children[0].users.len(), 1);
        assert!(root.children[0].children.is_empty());
    }

    #[tokio::test]
    async fn test_progress_callback() {
        let dir = org();
        let seen = RefCell::new(Vec::new());
        let progress = |n: usize, name: &str| seen.borrow_mut().push((n, name.to_string()));
        let walker =
            Walker::new(&dir, IdSelectors::default(), options(true)).with_progress(&progress);
        walker.walk(&[Identifier::stable("1")]).await;

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], (1, "Root".to_string()));
        assert_eq!(seen[3], (4, "Sales".to_string()));
    }

    #[tokio::test]
    async fn test_empty_roots() {
        let dir = org();
        let walker = Walker::new(&dir, IdSelectors::default(), options(true));
        let outcome = walker.walk(&[]).await;
        assert!(outcome.forest.is_empty());
        assert!(!outcome.is_partial());
    }
}
