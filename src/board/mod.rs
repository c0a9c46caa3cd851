use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::BoardError;
use crate::{NumArmies, PlayerId};

mod standard_board;

// Game board models the state of the board:
//
//    a) the owner of each territory
//    b) how many occupying armies on each territory
//
// Adjacency lives in an undirected graph whose nodes are the territories,
// so the relation is symmetric by construction.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Territory {
    name: String,
    continent: String,
    owner: Option<PlayerId>,
    armies: NumArmies,
}

impl Territory {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn continent(&self) -> &str {
        &self.continent
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn armies(&self) -> NumArmies {
        self.armies
    }

    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Continent {
    name: String,
    bonus: NumArmies,
    members: Vec<String>,
}

impl Continent {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bonus(&self) -> NumArmies {
        self.bonus
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }
}

pub type TerritoryGraph = UnGraph<Territory, ()>;

#[derive(Clone, Debug)]
pub struct Board {
    graph: TerritoryGraph,
    index: HashMap<String, NodeIndex>,
    continents: Vec<Continent>,
}

impl Board {
    /// The classic 42-territory world map.
    pub fn standard() -> Board {
        standard_board::standard_board()
    }

    /// A six-territory ring split over two continents, for tests and quick games.
    pub fn mini() -> Board {
        standard_board::mini_board()
    }

    fn node(&self, name: &str) -> Result<NodeIndex, BoardError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BoardError::UnknownTerritory(name.to_string()))
    }

    pub fn territory(&self, name: &str) -> Result<&Territory, BoardError> {
        Ok(&self.graph[self.node(name)?])
    }

    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.graph.node_weights()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn continents(&self) -> &[Continent] {
        &self.continents
    }

    pub fn continent(&self, name: &str) -> Result<&Continent, BoardError> {
        self.continents
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| BoardError::UnknownContinent(name.to_string()))
    }

    pub fn adjacent(&self, name: &str) -> Result<BTreeSet<String>, BoardError> {
        let node = self.node(name)?;
        Ok(self
            .graph
            .neighbors(node)
            .map(|n| self.graph[n].name.clone())
            .collect())
    }

    pub fn are_adjacent(&self, a: &str, b: &str) -> Result<bool, BoardError> {
        let (a, b) = (self.node(a)?, self.node(b)?);
        Ok(self.graph.find_edge(a, b).is_some())
    }

    /// The single owner of every territory in `continent`, if there is one.
    pub fn continent_owner(&self, continent: &str) -> Result<Option<PlayerId>, BoardError> {
        let continent = self.continent(continent)?;
        let mut owners = continent
            .members
            .iter()
            .map(|name| self.territory(name).map(Territory::owner))
            .collect::<Result<HashSet<_>, _>>()?
            .into_iter();
        match (owners.next(), owners.next()) {
            (Some(owner), None) => Ok(owner),
            _ => Ok(None),
        }
    }

    pub fn continent_owner_bonus(&self, continent: &str) -> Result<NumArmies, BoardError> {
        let bonus = self.continent(continent)?.bonus;
        Ok(match self.continent_owner(continent)? {
            Some(_) => bonus,
            None => 0,
        })
    }

    /// Sum of the bonuses of every continent `player` holds outright.
    pub fn continent_bonuses(&self, player: PlayerId) -> NumArmies {
        self.continents
            .iter()
            .filter(|c| matches!(self.continent_owner(&c.name), Ok(Some(owner)) if owner == player))
            .map(|c| c.bonus)
            .sum()
    }

    pub fn owned_by(&self, player: PlayerId) -> Vec<&Territory> {
        self.territories().filter(|t| t.is_owned_by(player)).collect()
    }

    pub fn owned_count(&self, player: PlayerId) -> usize {
        self.territories().filter(|t| t.is_owned_by(player)).count()
    }

    pub fn is_enemy_territory(&self, player: PlayerId, name: &str) -> Result<bool, BoardError> {
        Ok(!self.territory(name)?.is_owned_by(player))
    }

    pub fn is_fully_owned(&self) -> bool {
        self.territories().all(|t| t.owner.is_some())
    }

    /// Sets owner and army count directly. Setup only: mid-game changes go
    /// through the turn state machine.
    pub fn assign_owner(
        &mut self,
        name: &str,
        player: PlayerId,
        armies: NumArmies,
    ) -> Result<(), BoardError> {
        let node = self.node(name)?;
        let territory = &mut self.graph[node];
        territory.owner = Some(player);
        territory.armies = armies;
        Ok(())
    }

    // distributes the territories as equally as possible among the players,
    // one army each
    pub fn distribute_randomly<R: Rng>(&mut self, players: &[PlayerId], rng: &mut R) {
        if players.is_empty() {
            return;
        }
        let mut order: Vec<NodeIndex> = self.graph.node_indices().collect();
        order.shuffle(rng);

        let mut player_pool: Vec<PlayerId> = Vec::new();
        for node in order {
            if player_pool.is_empty() {
                player_pool = players.to_vec();
            }
            let pick = rng.random_range(0..player_pool.len());
            let owner = player_pool.swap_remove(pick);
            let territory = &mut self.graph[node];
            territory.owner = Some(owner);
            territory.armies = 1;
            log::debug!("owner of {} is {}", territory.name, owner);
        }
    }

    /// Whether `to` can be reached from `from` through territories all owned
    /// by `player`, both ends included.
    pub fn connected_through_owned(
        &self,
        player: PlayerId,
        from: &str,
        to: &str,
    ) -> Result<bool, BoardError> {
        let (start, goal) = (self.node(from)?, self.node(to)?);
        if !self.graph[start].is_owned_by(player) || !self.graph[goal].is_owned_by(player) {
            return Ok(false);
        }
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            if node == goal {
                return Ok(true);
            }
            for next in self.graph.neighbors(node) {
                if self.graph[next].is_owned_by(player) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        Ok(false)
    }

    pub(crate) fn add_armies(&mut self, name: &str, add: NumArmies) -> Result<(), BoardError> {
        let node = self.node(name)?;
        self.graph[node].armies += add;
        Ok(())
    }

    pub(crate) fn remove_armies(&mut self, name: &str, remove: NumArmies) -> Result<(), BoardError> {
        let node = self.node(name)?;
        let territory = &mut self.graph[node];
        if remove > territory.armies {
            return Err(BoardError::Invariant(format!(
                "cannot remove {} armies from {} holding {}",
                remove, territory.name, territory.armies
            )));
        }
        territory.armies -= remove;
        Ok(())
    }

    /// Hands an emptied territory to its conqueror with zero armies; the
    /// occupation move fills it.
    pub(crate) fn transfer(&mut self, name: &str, conqueror: PlayerId) -> Result<(), BoardError> {
        let node = self.node(name)?;
        let territory = &mut self.graph[node];
        if territory.armies != 0 {
            return Err(BoardError::Invariant(format!(
                "{} changed hands while holding {} armies",
                territory.name, territory.armies
            )));
        }
        territory.owner = Some(conqueror);
        Ok(())
    }

    /// Verifies the structural invariants: each territory sits in exactly one
    /// continent and adjacency has no self-loops or parallel edges.
    pub fn check(&self) -> Result<(), BoardError> {
        let mut membership: HashMap<&str, usize> = HashMap::new();
        for continent in &self.continents {
            for member in &continent.members {
                let territory = self.territory(member)?;
                if territory.continent != continent.name {
                    return Err(BoardError::Invariant(format!(
                        "{} listed in {} but belongs to {}",
                        member, continent.name, territory.continent
                    )));
                }
                *membership.entry(member.as_str()).or_default() += 1;
            }
        }
        for territory in self.territories() {
            match membership.get(territory.name.as_str()) {
                Some(1) => {}
                _ => {
                    return Err(BoardError::Invariant(format!(
                        "{} is not in exactly one continent",
                        territory.name
                    )))
                }
            }
        }
        let mut edges = HashSet::new();
        for edge in self.graph.raw_edges() {
            let (a, b) = (edge.source(), edge.target());
            if a == b {
                let name = self.graph[a].name.clone();
                return Err(BoardError::IllegalAdjacency(name.clone(), name));
            }
            if !edges.insert((a.min(b), a.max(b))) {
                return Err(BoardError::Invariant(format!(
                    "duplicate adjacency {} <-> {}",
                    self.graph[a].name, self.graph[b].name
                )));
            }
        }
        Ok(())
    }
}

/// Declarative board description; `build` validates everything at once.
#[derive(Clone, Debug, Default)]
pub struct BoardBuilder {
    continents: Vec<(String, NumArmies)>,
    territories: Vec<(String, String)>,
    edges: Vec<(String, String)>,
}

impl BoardBuilder {
    pub fn new() -> BoardBuilder {
        BoardBuilder::default()
    }

    pub fn continent(&mut self, name: &str, bonus: NumArmies) -> &mut Self {
        self.continents.push((name.to_string(), bonus));
        self
    }

    pub fn territory(&mut self, name: &str, continent: &str) -> &mut Self {
        self.territories.push((name.to_string(), continent.to_string()));
        self
    }

    pub fn connect(&mut self, a: &str, b: &str) -> &mut Self {
        self.edges.push((a.to_string(), b.to_string()));
        self
    }

    pub fn build(&self) -> Result<Board, BoardError> {
        let mut continents: Vec<Continent> = Vec::with_capacity(self.continents.len());
        for (name, bonus) in &self.continents {
            if continents.iter().any(|c| &c.name == name) {
                return Err(BoardError::Invariant(format!("continent declared twice: {}", name)));
            }
            continents.push(Continent {
                name: name.clone(),
                bonus: *bonus,
                members: Vec::new(),
            });
        }

        let mut graph = TerritoryGraph::with_capacity(self.territories.len(), self.edges.len());
        let mut index = HashMap::new();
        for (name, continent_name) in &self.territories {
            let continent = continents
                .iter_mut()
                .find(|c| &c.name == continent_name)
                .ok_or_else(|| BoardError::UnknownContinent(continent_name.clone()))?;
            if index.contains_key(name) {
                return Err(BoardError::DuplicateTerritory(name.clone()));
            }
            continent.members.push(name.clone());
            let node = graph.add_node(Territory {
                name: name.clone(),
                continent: continent_name.clone(),
                owner: None,
                armies: 0,
            });
            index.insert(name.clone(), node);
        }

        for (a, b) in &self.edges {
            if a == b {
                return Err(BoardError::IllegalAdjacency(a.clone(), b.clone()));
            }
            let lookup = |name: &String| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| BoardError::UnknownTerritory(name.clone()))
            };
            let (na, nb) = (lookup(a)?, lookup(b)?);
            // neighbour lists usually name each edge from both ends
            graph.update_edge(na, nb, ());
        }

        if let Some(empty) = continents.iter().find(|c| c.members.is_empty()) {
            return Err(BoardError::EmptyContinent(empty.name.clone()));
        }

        let board = Board {
            graph,
            index,
            continents,
        };
        board.check()?;
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line_board() -> Board {
        BoardBuilder::new()
            .continent("west", 2)
            .continent("east", 1)
            .territory("a", "west")
            .territory("b", "west")
            .territory("c", "east")
            .connect("a", "b")
            .connect("b", "c")
            .build()
            .unwrap()
    }

    #[test]
    fn standard_board_is_valid() {
        let board = Board::standard();
        assert_eq!(board.len(), 42);
        assert_eq!(board.continents().len(), 6);
        board.check().unwrap();
        let total: NumArmies = board.continents().iter().map(Continent::bonus).sum();
        assert_eq!(total, 24);
    }

    #[test]
    fn adjacency_is_symmetric_without_self_loops() {
        let board = Board::standard();
        for territory in board.territories() {
            let neighbours = board.adjacent(territory.name()).unwrap();
            assert!(!neighbours.contains(territory.name()));
            for n in &neighbours {
                assert!(board.adjacent(n).unwrap().contains(territory.name()));
            }
        }
    }

    #[test]
    fn unknown_territory_is_reported() {
        let board = line_board();
        assert_eq!(
            board.territory("z"),
            Err(BoardError::UnknownTerritory("z".to_string()))
        );
        assert!(board.adjacent("z").is_err());
    }

    #[test]
    fn builder_rejects_bad_declarations() {
        let self_loop = BoardBuilder::new()
            .continent("c", 1)
            .territory("a", "c")
            .connect("a", "a")
            .build();
        assert!(matches!(self_loop, Err(BoardError::IllegalAdjacency(..))));

        let orphan = BoardBuilder::new().continent("c", 1).territory("a", "x").build();
        assert_eq!(orphan.unwrap_err(), BoardError::UnknownContinent("x".to_string()));

        let empty = BoardBuilder::new()
            .continent("c", 1)
            .continent("d", 1)
            .territory("a", "c")
            .build();
        assert_eq!(empty.unwrap_err(), BoardError::EmptyContinent("d".to_string()));

        let twice = BoardBuilder::new()
            .continent("c", 1)
            .territory("a", "c")
            .territory("a", "c")
            .build();
        assert_eq!(twice.unwrap_err(), BoardError::DuplicateTerritory("a".to_string()));

        let dangling = BoardBuilder::new()
            .continent("c", 1)
            .territory("a", "c")
            .connect("a", "q")
            .build();
        assert_eq!(dangling.unwrap_err(), BoardError::UnknownTerritory("q".to_string()));
    }

    #[test]
    fn continent_bonus_requires_sole_owner() {
        let mut board = line_board();
        board.assign_owner("a", 0, 1).unwrap();
        board.assign_owner("b", 1, 1).unwrap();
        board.assign_owner("c", 1, 1).unwrap();
        assert_eq!(board.continent_owner_bonus("west").unwrap(), 0);
        assert_eq!(board.continent_owner_bonus("east").unwrap(), 1);

        board.assign_owner("a", 1, 1).unwrap();
        assert_eq!(board.continent_owner_bonus("west").unwrap(), 2);
        assert_eq!(board.continent_bonuses(1), 3);
        assert_eq!(board.continent_bonuses(0), 0);
        assert!(board.continent_owner_bonus("north").is_err());
    }

    #[test]
    fn unowned_continent_grants_nothing() {
        let board = line_board();
        assert_eq!(board.continent_owner("west").unwrap(), None);
        assert_eq!(board.continent_owner_bonus("west").unwrap(), 0);
    }

    #[test]
    fn owned_by_lists_territories() {
        let mut board = line_board();
        board.assign_owner("a", 0, 3).unwrap();
        board.assign_owner("c", 0, 1).unwrap();
        board.assign_owner("b", 1, 1).unwrap();
        let names: Vec<&str> = board.owned_by(0).iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(board.territory("a").unwrap().armies(), 3);
    }

    #[test]
    fn connectivity_only_crosses_owned_territory() {
        let mut board = line_board();
        board.assign_owner("a", 0, 3).unwrap();
        board.assign_owner("b", 1, 1).unwrap();
        board.assign_owner("c", 0, 1).unwrap();
        assert!(!board.connected_through_owned(0, "a", "c").unwrap());

        board.assign_owner("b", 0, 1).unwrap();
        assert!(board.connected_through_owned(0, "a", "c").unwrap());
        assert!(!board.connected_through_owned(1, "a", "c").unwrap());
    }

    #[test]
    fn random_distribution_is_balanced() {
        let mut board = Board::standard();
        let mut rng = StdRng::seed_from_u64(7);
        board.distribute_randomly(&[0, 1, 2, 3], &mut rng);
        assert!(board.is_fully_owned());
        let counts: Vec<usize> = (0..4).map(|p| board.owned_count(p)).collect();
        assert_eq!(counts.iter().sum::<usize>(), 42);
        let (min, max) = (counts.iter().min().unwrap(), counts.iter().max().unwrap());
        assert!(max - min <= 1, "{:?}", counts);
        assert!(board.territories().all(|t| t.armies() == 1));
        board.check().unwrap();
    }

    #[test]
    fn removing_too_many_armies_fails() {
        let mut board = line_board();
        board.assign_owner("a", 0, 2).unwrap();
        assert!(board.remove_armies("a", 3).is_err());
        board.remove_armies("a", 2).unwrap();
        board.transfer("a", 1).unwrap();
        assert_eq!(board.territory("a").unwrap().owner(), Some(1));
    }
}
