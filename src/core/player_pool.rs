use smallvec::SmallVec;

use super::PlayerId;

/// A seat in the game. The display name is known only after the participant introduced
/// themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    id: PlayerId,
    name: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self { id, name: None }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn is_registered(&self) -> bool {
        self.name.is_some()
    }
}

/// Players in turn order with a cyclic pointer to the player who moves next.
#[derive(Clone, Debug)]
pub struct PlayerPool {
    players: SmallVec<[Player; 2]>,
    current: usize,
}

impl PlayerPool {
    pub fn new(ids: impl IntoIterator<Item = PlayerId>) -> Self {
        Self {
            players: ids.into_iter().map(Player::new).collect(),
            current: 0,
        }
    }

    pub fn as_slice(&self) -> &[Player] {
        self.players.as_slice()
    }

    /// Get the player whose turn it is without advancing the queue
    pub fn get_current(&self) -> Option<&Player> {
        self.players.get(self.current)
    }

    /// Advance the queue by one and return the player whose turn it is now
    pub fn next(&mut self) -> Option<&Player> {
        if self.players.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.players.len();
        self.get_current()
    }

    pub fn find(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn find_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_current() {
        let mut pool = PlayerPool::new([1, 2]);

        // starting with the first element
        assert_eq!(pool.get_current().map(Player::id), Some(1));
        // calling multiple times doesn't change anything
        assert_eq!(pool.get_current().map(Player::id), Some(1));

        assert_eq!(pool.next().map(Player::id), Some(2));
        assert_eq!(pool.get_current().map(Player::id), Some(2));
    }

    #[test]
    fn test_cyclic_iteration() {
        let mut pool = PlayerPool::new([1, 2]);
        itertools::assert_equal(
            std::iter::from_fn(|| pool.next().map(Player::id)).take(5),
            [2, 1, 2, 1, 2],
        );
    }

    #[test]
    fn test_empty_pool() {
        let mut pool = PlayerPool::new([]);
        assert!(pool.get_current().is_none());
        assert!(pool.next().is_none());
    }

    #[test]
    fn test_find_and_register() {
        let mut pool = PlayerPool::new([1, 2]);
        assert!(!pool.as_slice().iter().any(Player::is_registered));

        pool.find_mut(2).unwrap().set_name("Bob");
        assert_eq!(pool.find(2).and_then(Player::name), Some("Bob"));
        assert_eq!(pool.find(1).and_then(Player::name), None);
        assert!(!pool.find(1).unwrap().is_registered());

        pool.find_mut(1).unwrap().set_name("Alice");
        assert!(pool.as_slice().iter().all(Player::is_registered));
        assert!(pool.find(3).is_none());
    }

    #[test]
    fn test_as_slice() {
        let mut pool = PlayerPool::new([1, 2]);
        itertools::assert_equal(pool.as_slice().iter().map(Player::id), [1, 2]);

        // advancing the queue doesn't affect as_slice
        pool.next();
        itertools::assert_equal(pool.as_slice().iter().map(Player::id), [1, 2]);
    }
}
