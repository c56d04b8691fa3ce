//! # Print Command Implementation
//!
//! Displays what a manifest records. By default this is the package summary;
//! `--tree` instead shows each repository with the dependencies it provides.
//!
//! This command is read-only and never runs the VCS client.

use std::borrow::Cow;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};

use depfreeze::manifest::PackageSnapshot;
use depfreeze::output::StatusWriter;

use crate::cli::Context;

/// Print the summary stored in a manifest
#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Manifest file to read
    #[arg(short, long, value_name = "FILE", env = "DEPFREEZE_MANIFEST")]
    pub file: PathBuf,

    /// Show repositories and their dependencies as a tree
    #[arg(long)]
    pub tree: bool,
}

/// Execute the `print` command.
pub fn execute(args: PrintArgs, ctx: &Context) -> Result<()> {
    let mut status = StatusWriter::stdout(ctx.output.clone());
    let snapshot = super::load_manifest(&args.file, &mut status)?;
    status.writeln("");

    if args.tree {
        print_tree(&build_tree(&snapshot))
            .map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
    } else {
        for line in snapshot.summary().lines() {
            status.writeln(line);
        }
    }
    Ok(())
}

/// Groups dependency names under the repository whose home contains them.
///
/// When repositories are nested, a dependency belongs to the innermost one.
fn build_tree(snapshot: &PackageSnapshot) -> TreeNode {
    let repos = snapshot.repositories();
    let mut provided: Vec<Vec<TreeNode>> = vec![Vec::new(); repos.len()];
    let mut others = Vec::new();

    for name in &snapshot.dot_deps {
        let owner = repos
            .iter()
            .enumerate()
            .filter(|(_, repo)| is_within(name, &repo.home_dir))
            .max_by_key(|(_, repo)| repo.home_dir.len())
            .map(|(i, _)| i);
        match owner {
            Some(i) => provided[i].push(TreeNode::leaf(name.clone())),
            None => others.push(TreeNode::leaf(name.clone())),
        }
    }

    let mut children: Vec<TreeNode> = repos
        .iter()
        .zip(provided)
        .map(|(repo, deps)| TreeNode {
            label: if repo.describe.is_empty() {
                repo.home_dir.clone()
            } else {
                format!("{} @ {}", repo.home_dir, repo.describe)
            },
            children: deps,
        })
        .collect();
    if !others.is_empty() {
        children.push(TreeNode {
            label: "(built in or untracked)".to_string(),
            children: others,
        });
    }

    TreeNode {
        label: snapshot.target_package.clone(),
        children,
    }
}

fn is_within(name: &str, home: &str) -> bool {
    !home.is_empty()
        && name
            .strip_prefix(home)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: vec![],
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
