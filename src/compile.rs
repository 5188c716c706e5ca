use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::{CompileError, CompiledRule, Condition, FieldName, Rule, RuleTable};

pub(crate) fn compile(rules: &[Rule]) -> Result<RuleTable, CompileError> {
    let compiled: Vec<CompiledRule> = rules
        .iter()
        .enumerate()
        .map(|(index, rule)| compile_rule(index, rule))
        .collect::<Result<_, _>>()?;

    let mut by_source: HashMap<FieldName, Vec<usize>> = HashMap::new();
    for rule in &compiled {
        by_source.entry(rule.source.clone()).or_default().push(rule.index);
    }

    check_acyclic(&compiled, &by_source)?;

    for field in shared_targets(&compiled) {
        debug!("field '{}' is targeted by more than one source", field);
    }

    debug!(
        "compiled rule table: {} rules, {} sources",
        compiled.len(),
        by_source.len()
    );

    Ok(RuleTable {
        rules: compiled,
        by_source,
    })
}

fn compile_rule(index: usize, rule: &Rule) -> Result<CompiledRule, CompileError> {
    let field = |name: &str| FieldName::parse(name).ok_or_else(|| invalid(index, rule, name));

    let source = field(&rule.source)?;

    if rule.targets.is_empty() {
        return Err(CompileError::NoTargets {
            rule: index,
            source_field: rule.source.clone(),
        });
    }
    let targets = rule
        .targets
        .iter()
        .map(|t| field(t))
        .collect::<Result<Vec<_>, _>>()?;

    let condition = match (&rule.values, rule.min_value) {
        (Some(_), Some(_)) => {
            return Err(CompileError::ConflictingCondition {
                rule: index,
                source_field: rule.source.clone(),
            });
        }
        (Some(values), None) => Condition::OneOf(values.clone()),
        (None, Some(min)) => Condition::AtLeast(min),
        (None, None) => Condition::Never,
    };

    Ok(CompiledRule {
        source,
        condition,
        targets,
        indent: rule.indent,
        index,
    })
}

fn invalid(index: usize, rule: &Rule, name: &str) -> CompileError {
    CompileError::InvalidFieldName {
        rule: index,
        source_field: rule.source.clone(),
        name: name.to_owned(),
    }
}

/// Edges of the dependency graph: source -> each target that is itself a
/// source. Nodes are listed in first-seen table order for deterministic
/// error paths.
fn dependency_graph<'a>(
    rules: &'a [CompiledRule],
    by_source: &HashMap<FieldName, Vec<usize>>,
) -> (Vec<&'a str>, HashMap<&'a str, Vec<&'a str>>) {
    let mut nodes: Vec<&str> = Vec::new();
    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    for rule in rules {
        let source = rule.source.as_str();
        if !adj.contains_key(source) {
            nodes.push(source);
        }
        let edges = adj.entry(source).or_default();
        for target in &rule.targets {
            let target = target.as_str();
            if by_source.contains_key(target) && !edges.contains(&target) {
                edges.push(target);
            }
        }
    }
    (nodes, adj)
}

/// Kahn's algorithm over source fields; falls back to a DFS to report the
/// cycle path.
fn check_acyclic(
    rules: &[CompiledRule],
    by_source: &HashMap<FieldName, Vec<usize>>,
) -> Result<(), CompileError> {
    let (nodes, adj) = dependency_graph(rules, by_source);

    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|&n| (n, 0)).collect();
    for targets in adj.values() {
        for target in targets {
            if let Some(deg) = in_degree.get_mut(target) {
                *deg += 1;
            }
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .copied()
        .filter(|n| in_degree.get(n) == Some(&0))
        .collect();
    let mut visited = 0;

    while let Some(node) = queue.pop_front() {
        visited += 1;
        if let Some(targets) = adj.get(node) {
            for target in targets {
                if let Some(deg) = in_degree.get_mut(target) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(*target);
                    }
                }
            }
        }
    }

    if visited != nodes.len() {
        return Err(CompileError::CyclicDependency {
            path: find_cycle(&nodes, &adj),
        });
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DfsState {
    Unvisited,
    InStack,
    Done,
}

/// DFS-based cycle finder for error reporting.
fn find_cycle<'a>(nodes: &[&'a str], adj: &HashMap<&'a str, Vec<&'a str>>) -> Vec<String> {
    let mut state: HashMap<&str, DfsState> =
        nodes.iter().map(|&n| (n, DfsState::Unvisited)).collect();
    let mut stack: Vec<&str> = Vec::new();

    for &node in nodes {
        if state.get(node) == Some(&DfsState::Unvisited) {
            if let Some(cycle) = dfs(node, adj, &mut state, &mut stack) {
                return cycle;
            }
        }
    }

    // Shouldn't reach here if called after the topological pass found a cycle
    vec![]
}

fn dfs<'a>(
    node: &'a str,
    adj: &HashMap<&str, Vec<&'a str>>,
    state: &mut HashMap<&'a str, DfsState>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    state.insert(node, DfsState::InStack);
    stack.push(node);

    if let Some(neighbors) = adj.get(node) {
        for &neighbor in neighbors {
            match state.get(neighbor) {
                Some(DfsState::InStack) => {
                    let pos = stack.iter().position(|&n| n == neighbor)?;
                    let mut cycle: Vec<String> =
                        stack[pos..].iter().map(|&s| s.to_owned()).collect();
                    cycle.push(neighbor.to_owned());
                    return Some(cycle);
                }
                Some(DfsState::Unvisited) | None => {
                    if let Some(cycle) = dfs(neighbor, adj, state, stack) {
                        return Some(cycle);
                    }
                }
                Some(DfsState::Done) => {}
            }
        }
    }

    stack.pop();
    state.insert(node, DfsState::Done);
    None
}

/// Fields that appear as a target of more than one source. Not an error, but
/// such fields are shown or hidden by whichever rule ran last.
fn shared_targets(rules: &[CompiledRule]) -> Vec<&str> {
    let mut owner: HashMap<&str, &str> = HashMap::new();
    let mut shared: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for rule in rules {
        for target in &rule.targets {
            let target = target.as_str();
            match owner.get(target) {
                Some(&src) if src != rule.source.as_str() => {
                    if seen.insert(target) {
                        shared.push(target);
                    }
                }
                Some(_) => {}
                None => {
                    owner.insert(target, rule.source.as_str());
                }
            }
        }
    }
    shared
}
