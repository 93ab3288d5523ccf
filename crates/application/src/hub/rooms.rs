//! 房间成员关系
//!
//! (用户, 房间) 关系的双向索引。房间在首次 join 时隐式出现，
//! 成员清零后即被剪除，不会被任何查询当作"仍有成员"。

use std::collections::{HashMap, HashSet};

use domain::{RoomId, UserId};

#[derive(Debug, Default)]
pub struct RoomTracker {
    room_users: HashMap<RoomId, HashSet<UserId>>,
    user_rooms: HashMap<UserId, HashSet<RoomId>>,
}

impl RoomTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 幂等：重复 join 是空操作
    pub fn join(&mut self, user_id: UserId, room_id: RoomId) {
        self.room_users
            .entry(room_id.clone())
            .or_default()
            .insert(user_id);
        self.user_rooms.entry(user_id).or_default().insert(room_id);
    }

    /// 幂等：离开未加入的房间是空操作
    pub fn leave(&mut self, user_id: UserId, room_id: &RoomId) {
        if let Some(users) = self.room_users.get_mut(room_id) {
            users.remove(&user_id);
            if users.is_empty() {
                self.room_users.remove(room_id);
            }
        }
        if let Some(rooms) = self.user_rooms.get_mut(&user_id) {
            rooms.remove(room_id);
            if rooms.is_empty() {
                self.user_rooms.remove(&user_id);
            }
        }
    }

    /// 断开清理：移除用户全部成员关系，返回其曾属于的房间
    pub fn leave_all(&mut self, user_id: UserId) -> Vec<RoomId> {
        let rooms: Vec<RoomId> = self
            .user_rooms
            .remove(&user_id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();

        for room_id in &rooms {
            if let Some(users) = self.room_users.get_mut(room_id) {
                users.remove(&user_id);
                if users.is_empty() {
                    self.room_users.remove(room_id);
                }
            }
        }

        rooms
    }

    /// 房间当前成员，房间不存在时为空
    pub fn members(&self, room_id: &RoomId) -> impl Iterator<Item = &UserId> {
        self.room_users.get(room_id).into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new(uuid::Uuid::new_v4())
    }

    fn room(name: &str) -> RoomId {
        RoomId::parse(name).unwrap()
    }

    #[test]
    fn join_is_idempotent_single_leave_removes() {
        let mut tracker = RoomTracker::new();
        let alice = user();
        let thread = room("thread-1");

        tracker.join(alice, thread.clone());
        tracker.join(alice, thread.clone());
        tracker.leave(alice, &thread);

        assert_eq!(tracker.members(&thread).count(), 0);
        assert!(tracker.leave_all(alice).is_empty());
    }

    #[test]
    fn leave_unknown_room_is_noop() {
        let mut tracker = RoomTracker::new();
        tracker.leave(user(), &room("ghost"));
    }

    #[test]
    fn leave_all_purges_every_membership() {
        let mut tracker = RoomTracker::new();
        let alice = user();
        let bob = user();
        let r1 = room("r1");
        let r2 = room("r2");

        tracker.join(alice, r1.clone());
        tracker.join(alice, r2.clone());
        tracker.join(bob, r1.clone());

        let mut left = tracker.leave_all(alice);
        left.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        assert_eq!(left, vec![r1.clone(), r2.clone()]);

        // 再次清理是空操作
        assert!(tracker.leave_all(alice).is_empty());
        // bob 仍在 r1，空房间 r2 已被剪除
        assert_eq!(tracker.members(&r1).collect::<Vec<_>>(), vec![&bob]);
        assert_eq!(tracker.members(&r2).count(), 0);
    }
}
