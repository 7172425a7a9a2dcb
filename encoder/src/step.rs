use std::fmt;
use network::TunnelNetwork;

/// The two symbols a stack cell can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StackSymbol {
    Four,
    Six,
}

impl StackSymbol {
    pub const ALL: [StackSymbol; 2] = [StackSymbol::Four, StackSymbol::Six];

    /// The stack starts and ends with this single symbol.
    pub const BASE: StackSymbol = StackSymbol::Four;

    pub fn other(&self) -> StackSymbol {
        match self {
            StackSymbol::Four => StackSymbol::Six,
            StackSymbol::Six => StackSymbol::Four,
        }
    }
}

impl fmt::Display for StackSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackSymbol::Four => write!(f, "4"),
            StackSymbol::Six => write!(f, "6"),
        }
    }
}

/// What a single step does to the stack.
///
/// Each variant names the cells it reads so that every variant
/// corresponds to one shape of transition in the reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// The stack is left unchanged; the top holds the given symbol.
    Transmit(StackSymbol),
    /// `pushed` is written on top of a cell holding `below`.
    Push { below: StackSymbol, pushed: StackSymbol },
    /// `popped` is removed, exposing `exposed` as the new top.
    Pop { popped: StackSymbol, exposed: StackSymbol },
}

impl Action {
    /// Every action, transmits first, then pushes, then pops.
    pub fn all() -> impl Iterator<Item = Action> {
        let transmits = StackSymbol::ALL.into_iter().map(Action::Transmit);
        let pushes = StackSymbol::ALL.into_iter().flat_map(|below| {
            StackSymbol::ALL
                .into_iter()
                .map(move |pushed| Action::Push { below, pushed })
        });
        let pops = StackSymbol::ALL.into_iter().flat_map(|popped| {
            StackSymbol::ALL
                .into_iter()
                .map(move |exposed| Action::Pop { popped, exposed })
        });
        transmits.chain(pushes).chain(pops)
    }

    pub fn height_delta(&self) -> isize {
        match self {
            Action::Transmit(_) => 0,
            Action::Push { .. } => 1,
            Action::Pop { .. } => -1,
        }
    }

    /// The height after this action starting from `height`, if the result
    /// stays within `0..capacity`.
    pub fn target_height(&self, height: usize, capacity: usize) -> Option<usize> {
        let target = height.checked_add_signed(self.height_delta())?;
        (target < capacity).then_some(target)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Transmit(top) => write!(f, "transmit {top}"),
            Action::Push { below, pushed } => write!(f, "push {pushed} on {below}"),
            Action::Pop { popped, exposed } => write!(f, "pop {popped} off {exposed}"),
        }
    }
}

/// One decoded transition of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub action: Action,
    pub from: usize,
    pub to: usize,
}

impl Step {
    pub fn new(action: Action, from: usize, to: usize) -> Self {
        Step { action, from, to }
    }

    /// Renders the step with the network's node names.
    pub fn display_with<'a>(&'a self, network: &'a TunnelNetwork) -> impl fmt::Display + 'a {
        NamedStep { step: self, network }
    }
}

struct NamedStep<'a> {
    step: &'a Step,
    network: &'a TunnelNetwork,
}

impl fmt::Display for NamedStep<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --[{}]--> {}",
            self.network.node_name(self.step.from),
            self.step.action,
            self.network.node_name(self.step.to)
        )
    }
}

/// Heights visited by a decoded path, starting from height 0.
pub fn height_profile(path: &[Step]) -> Vec<isize> {
    let mut heights = vec![0];
    for step in path {
        let last = heights[heights.len() - 1];
        heights.push(last + step.action.height_delta());
    }
    heights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_enumeration() {
        let actions: Vec<Action> = Action::all().collect();
        assert_eq!(actions.len(), 10);
        assert_eq!(actions.iter().filter(|a| a.height_delta() == 0).count(), 2);
        assert_eq!(actions.iter().filter(|a| a.height_delta() == 1).count(), 4);
        assert_eq!(actions.iter().filter(|a| a.height_delta() == -1).count(), 4);
    }

    #[test]
    fn test_target_height() {
        let push = Action::Push { below: StackSymbol::Four, pushed: StackSymbol::Six };
        let pop = Action::Pop { popped: StackSymbol::Six, exposed: StackSymbol::Four };
        assert_eq!(push.target_height(0, 2), Some(1));
        assert_eq!(push.target_height(1, 2), None);
        assert_eq!(pop.target_height(0, 2), None);
        assert_eq!(pop.target_height(1, 2), Some(0));
        assert_eq!(Action::Transmit(StackSymbol::Four).target_height(1, 2), Some(1));
    }

    #[test]
    fn test_display() {
        let network = TunnelNetwork::new(vec!["a", "b"], vec![(0, 1)], 0, 1).unwrap();
        let step = Step::new(Action::Push { below: StackSymbol::Four, pushed: StackSymbol::Six }, 0, 1);
        assert_eq!(step.display_with(&network).to_string(), "a --[push 6 on 4]--> b");
        assert_eq!(Action::Pop { popped: StackSymbol::Six, exposed: StackSymbol::Four }.to_string(), "pop 6 off 4");
        assert_eq!(StackSymbol::Four.other(), StackSymbol::Six);
    }

    #[test]
    fn test_height_profile() {
        let path = [
            Step::new(Action::Push { below: StackSymbol::Four, pushed: StackSymbol::Four }, 0, 1),
            Step::new(Action::Transmit(StackSymbol::Four), 1, 2),
            Step::new(Action::Pop { popped: StackSymbol::Four, exposed: StackSymbol::Four }, 2, 3),
        ];
        assert_eq!(height_profile(&path), vec![0, 1, 1, 0]);
    }
}
