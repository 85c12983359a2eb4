//! In-memory repository for exercising release logic without git

use super::Vcs;
use crate::core::error::{GitError, ProjectorError, ProjectorResult};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

#[derive(Debug, Default)]
struct State {
  /// commit -> parents
  commits: BTreeMap<String, Vec<String>>,
  branches: BTreeMap<String, String>,
  tags: BTreeMap<String, String>,
  upstreams: BTreeMap<String, String>,
  current: Option<String>,
  detached: Option<String>,
  describe: String,
  dirty: bool,
  fail_on: BTreeSet<String>,
  log: Vec<String>,
}

/// A commit graph with branches and tags, plus failure injection per operation
#[derive(Debug, Default)]
pub struct FakeVcs {
  state: RefCell<State>,
}

impl FakeVcs {
  /// Repository with `master` and `develop` on one root commit, `develop` checked out
  pub fn with_layout() -> Self {
    let vcs = Self::default();
    {
      let mut state = vcs.state.borrow_mut();
      state.commits.insert("c0".into(), vec![]);
      state.branches.insert("master".into(), "c0".into());
      state.branches.insert("develop".into(), "c0".into());
      state.current = Some("develop".into());
      state.describe = "v0".into();
    }
    vcs
  }

  /// Add a commit on top of `branch`
  pub fn commit_on(&self, branch: &str) -> String {
    let mut state = self.state.borrow_mut();
    let parent = state.branches[branch].clone();
    let sha = format!("c{}", state.commits.len());
    state.commits.insert(sha.clone(), vec![parent]);
    state.branches.insert(branch.to_string(), sha.clone());
    sha
  }

  pub fn add_tag(&self, name: &str, target: &str) {
    let mut state = self.state.borrow_mut();
    let sha = resolve(&state, target).unwrap_or_else(|| target.to_string());
    state.tags.insert(name.to_string(), sha);
  }

  pub fn set_upstream(&self, branch: &str, upstream: &str, head: &str) {
    let mut state = self.state.borrow_mut();
    state.upstreams.insert(branch.to_string(), upstream.to_string());
    state.branches.insert(upstream.to_string(), head.to_string());
  }

  pub fn set_describe(&self, describe: &str) {
    self.state.borrow_mut().describe = describe.to_string();
  }

  pub fn set_dirty(&self, dirty: bool) {
    self.state.borrow_mut().dirty = dirty;
  }

  /// Make every call to `operation` fail
  pub fn fail_on(&self, operation: &str) {
    self.state.borrow_mut().fail_on.insert(operation.to_string());
  }

  /// Operations performed so far, as `name arg...`
  pub fn log(&self) -> Vec<String> {
    self.state.borrow().log.clone()
  }

  pub fn create_stray_branch(&self, name: &str) {
    let mut state = self.state.borrow_mut();
    let head = state.branches["develop"].clone();
    state.branches.insert(name.to_string(), head);
  }

  fn record(&self, operation: &str, args: &[&str]) -> ProjectorResult<()> {
    let mut state = self.state.borrow_mut();
    let entry = std::iter::once(operation).chain(args.iter().copied()).collect::<Vec<_>>().join(" ");
    state.log.push(entry.clone());
    if state.fail_on.contains(operation) {
      return Err(ProjectorError::Git(GitError::CommandFailed {
        command: entry,
        stderr: "injected failure".to_string(),
      }));
    }
    Ok(())
  }
}

fn resolve(state: &State, rev: &str) -> Option<String> {
  if let Some(sha) = state.branches.get(rev) {
    return Some(sha.clone());
  }
  if let Some(sha) = state.tags.get(rev) {
    return Some(sha.clone());
  }
  if rev == "HEAD" {
    return state
      .current
      .as_ref()
      .and_then(|b| state.branches.get(b).cloned())
      .or_else(|| state.detached.clone());
  }
  state.commits.contains_key(rev).then(|| rev.to_string())
}

fn reaches(state: &State, from: &str, target: &str) -> bool {
  let mut queue = VecDeque::from([from.to_string()]);
  let mut seen = BTreeSet::new();
  while let Some(sha) = queue.pop_front() {
    if sha == target {
      return true;
    }
    if seen.insert(sha.clone())
      && let Some(parents) = state.commits.get(&sha)
    {
      queue.extend(parents.iter().cloned());
    }
  }
  false
}

fn missing(rev: &str) -> ProjectorError {
  ProjectorError::Git(GitError::RefNotFound { name: rev.to_string() })
}

impl Vcs for FakeVcs {
  fn current_branch(&self) -> ProjectorResult<Option<String>> {
    Ok(self.state.borrow().current.clone())
  }

  fn branches(&self) -> ProjectorResult<BTreeSet<String>> {
    Ok(self.state.borrow().branches.keys().filter(|b| !b.contains('/')).cloned().collect())
  }

  fn tags(&self) -> ProjectorResult<BTreeSet<String>> {
    Ok(self.state.borrow().tags.keys().cloned().collect())
  }

  fn branch_head(&self, branch: &str) -> ProjectorResult<Option<String>> {
    Ok(self.state.borrow().branches.get(branch).cloned())
  }

  fn checkout(&self, rev: &str) -> ProjectorResult<()> {
    self.record("checkout", &[rev])?;
    let mut state = self.state.borrow_mut();
    if state.branches.contains_key(rev) {
      state.current = Some(rev.to_string());
      state.detached = None;
    } else {
      let sha = resolve(&state, rev).ok_or_else(|| missing(rev))?;
      state.current = None;
      state.detached = Some(sha);
    }
    Ok(())
  }

  fn force_checkout(&self, branch: &str) -> ProjectorResult<()> {
    self.record("force_checkout", &[branch])?;
    let mut state = self.state.borrow_mut();
    if !state.branches.contains_key(branch) {
      return Err(missing(branch));
    }
    state.current = Some(branch.to_string());
    state.detached = None;
    state.dirty = false;
    Ok(())
  }

  fn merge(&self, branch: &str, no_ff: bool, _message: Option<&str>) -> ProjectorResult<()> {
    self.record("merge", &[branch])?;
    let mut state = self.state.borrow_mut();
    let current = state.current.clone().ok_or_else(|| missing("HEAD"))?;
    let ours = state.branches[&current].clone();
    let theirs = resolve(&state, branch).ok_or_else(|| missing(branch))?;
    if reaches(&state, &ours, &theirs) {
      return Ok(());
    }
    let new_head = if !no_ff && reaches(&state, &theirs, &ours) {
      theirs
    } else {
      let sha = format!("c{}", state.commits.len());
      state.commits.insert(sha.clone(), vec![ours, theirs]);
      sha
    };
    state.branches.insert(current, new_head);
    Ok(())
  }

  fn create_tag(&self, name: &str, _message: &str) -> ProjectorResult<()> {
    self.record("create_tag", &[name])?;
    let mut state = self.state.borrow_mut();
    let head = resolve(&state, "HEAD").ok_or_else(|| missing("HEAD"))?;
    state.tags.insert(name.to_string(), head);
    Ok(())
  }

  fn delete_tag(&self, name: &str) -> ProjectorResult<()> {
    self.record("delete_tag", &[name])?;
    self.state.borrow_mut().tags.remove(name).map(|_| ()).ok_or_else(|| missing(name))
  }

  fn delete_branch(&self, name: &str) -> ProjectorResult<()> {
    self.record("delete_branch", &[name])?;
    self.state.borrow_mut().branches.remove(name).map(|_| ()).ok_or_else(|| missing(name))
  }

  fn reset_branch(&self, branch: &str, commit: &str) -> ProjectorResult<()> {
    self.record("reset_branch", &[branch, commit])?;
    let mut state = self.state.borrow_mut();
    state.branches.insert(branch.to_string(), commit.to_string());
    state.current = Some(branch.to_string());
    state.detached = None;
    state.dirty = false;
    Ok(())
  }

  fn fetch(&self, remote: &str) -> ProjectorResult<()> {
    self.record("fetch", &[remote])
  }

  fn push_branches(&self, remote: &str) -> ProjectorResult<()> {
    self.record("push_branches", &[remote])
  }

  fn push_tags(&self, remote: &str) -> ProjectorResult<()> {
    self.record("push_tags", &[remote])
  }

  fn is_ancestor(&self, ancestor: &str, descendant: &str) -> ProjectorResult<bool> {
    let state = self.state.borrow();
    let ancestor = resolve(&state, ancestor).ok_or_else(|| missing(ancestor))?;
    let descendant = resolve(&state, descendant).ok_or_else(|| missing(descendant))?;
    Ok(reaches(&state, &descendant, &ancestor))
  }

  fn upstream(&self, branch: &str) -> ProjectorResult<Option<String>> {
    Ok(self.state.borrow().upstreams.get(branch).cloned())
  }

  fn describe(&self) -> ProjectorResult<String> {
    self.record("describe", &[])?;
    Ok(self.state.borrow().describe.clone())
  }

  fn has_uncommitted_changes(&self) -> ProjectorResult<bool> {
    Ok(self.state.borrow().dirty)
  }

  fn is_modified(&self, _path: &Path) -> ProjectorResult<bool> {
    Ok(self.state.borrow().dirty)
  }
}
