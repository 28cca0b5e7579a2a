use crate::model::{Window, WindowId};
use crate::sys::driver::Surface;

/// Ordered collection of managed windows. Order is the tiling order: the
/// first tileable window on a surface is its master.
#[derive(Debug, Default)]
pub struct WindowStore {
    list: Vec<Window>,
}

impl WindowStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.list.len() }

    pub fn is_empty(&self) -> bool { self.list.is_empty() }

    pub fn index_of(&self, id: WindowId) -> Option<usize> {
        self.list.iter().position(|w| w.id == id)
    }

    pub fn contains(&self, id: WindowId) -> bool { self.index_of(id).is_some() }

    pub fn get(&self, id: WindowId) -> Option<&Window> { self.list.iter().find(|w| w.id == id) }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.list.iter_mut().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Window> { self.list.iter() }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Window> { self.list.iter_mut() }

    pub fn ids(&self) -> Vec<WindowId> { self.list.iter().map(|w| w.id).collect() }

    pub fn push(&mut self, window: Window) { self.list.push(window) }

    pub fn unshift(&mut self, window: Window) { self.list.insert(0, window) }

    /// Inserts right after the master, or at the end of a shorter list.
    pub fn beside_first(&mut self, window: Window) {
        let idx = self.list.len().min(1);
        self.list.insert(idx, window);
    }

    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let idx = self.index_of(id)?;
        Some(self.list.remove(idx))
    }

    /// Relocates `src` next to `dst`. The destination index is taken before
    /// `src` is removed, so moving forward lands one slot past a plain
    /// insert-before.
    pub fn move_window(&mut self, src: WindowId, dst: WindowId, after: bool) {
        let (Some(src_idx), Some(dst_idx)) = (self.index_of(src), self.index_of(dst)) else {
            return;
        };
        let window = self.list.remove(src_idx);
        let idx = if after { dst_idx + 1 } else { dst_idx };
        self.list.insert(idx.min(self.list.len()), window);
    }

    pub fn set_master(&mut self, id: WindowId) {
        let Some(idx) = self.index_of(id) else { return };
        let window = self.list.remove(idx);
        self.list.insert(0, window);
    }

    pub fn swap(&mut self, a: WindowId, b: WindowId) {
        let (Some(a), Some(b)) = (self.index_of(a), self.index_of(b)) else {
            return;
        };
        self.list.swap(a, b);
    }

    pub fn visible_windows<'a>(&'a self, srf: &'a Surface) -> impl Iterator<Item = &'a Window> {
        self.list.iter().filter(move |w| w.visible_on(srf))
    }

    pub fn visible_tiles<'a>(&'a self, srf: &'a Surface) -> impl Iterator<Item = &'a Window> {
        self.visible_windows(srf).filter(|w| w.is_tiled())
    }

    pub fn visible_tileables<'a>(&'a self, srf: &'a Surface) -> impl Iterator<Item = &'a Window> {
        self.visible_windows(srf).filter(|w| w.is_tileable())
    }

    pub fn visible_windows_mut<'a>(
        &'a mut self,
        srf: &'a Surface,
    ) -> impl Iterator<Item = &'a mut Window> {
        self.list.iter_mut().filter(move |w| w.visible_on(srf))
    }

    pub fn visible_tiles_mut<'a>(
        &'a mut self,
        srf: &'a Surface,
    ) -> impl Iterator<Item = &'a mut Window> {
        self.visible_windows_mut(srf).filter(|w| w.is_tiled())
    }

    pub fn visible_tileables_mut<'a>(
        &'a mut self,
        srf: &'a Surface,
    ) -> impl Iterator<Item = &'a mut Window> {
        self.visible_windows_mut(srf).filter(|w| w.is_tileable())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::WindowState;
    use crate::sys::geometry::Rect;
    use crate::sys::headless::{HeadlessWindow, WindowSpec, test_surface};

    fn win(id: u64) -> Window {
        Window::new(Box::new(HeadlessWindow::new(WindowSpec::new(
            id,
            "app",
            Rect::new(0, 0, 10, 10),
        ))))
    }

    fn store(ids: &[u64]) -> WindowStore {
        let mut store = WindowStore::new();
        for &id in ids {
            store.push(win(id));
        }
        store
    }

    fn order(store: &WindowStore) -> Vec<u64> { store.ids().into_iter().map(|w| w.0).collect() }

    #[test]
    fn insertion_policies() {
        let mut s = store(&[1]);
        s.unshift(win(2));
        s.beside_first(win(3));
        s.push(win(4));
        assert_eq!(order(&s), vec![2, 3, 1, 4]);

        let mut empty = WindowStore::new();
        empty.beside_first(win(9));
        assert_eq!(order(&empty), vec![9]);
    }

    #[test]
    fn move_uses_destination_index_before_removal() {
        let mut s = store(&[1, 2, 3, 4]);
        s.move_window(WindowId(1), WindowId(3), false);
        assert_eq!(order(&s), vec![2, 3, 1, 4]);

        let mut s = store(&[1, 2, 3, 4]);
        s.move_window(WindowId(4), WindowId(2), true);
        assert_eq!(order(&s), vec![1, 2, 4, 3]);

        let mut s = store(&[1, 2, 3]);
        s.move_window(WindowId(1), WindowId(3), true);
        assert_eq!(order(&s), vec![2, 3, 1]);
    }

    #[test]
    fn master_swap_and_missing_ids() {
        let mut s = store(&[1, 2, 3]);
        s.set_master(WindowId(3));
        assert_eq!(order(&s), vec![3, 1, 2]);
        s.swap(WindowId(3), WindowId(2));
        assert_eq!(order(&s), vec![2, 1, 3]);
        s.swap(WindowId(3), WindowId(42));
        s.set_master(WindowId(42));
        s.move_window(WindowId(42), WindowId(1), false);
        assert_eq!(order(&s), vec![2, 1, 3]);
        assert!(s.remove(WindowId(42)).is_none());
    }

    #[test]
    fn visibility_queries_filter_by_state() {
        let srf = test_surface("out", Rect::new(0, 0, 100, 100));
        let mut s = store(&[1, 2, 3]);
        for w in s.iter_mut() {
            w.set_surface(&srf);
        }
        s.get_mut(WindowId(1)).unwrap().set_state(WindowState::Tiled);
        s.get_mut(WindowId(2)).unwrap().set_state(WindowState::TiledAfloat);
        s.get_mut(WindowId(3)).unwrap().set_state(WindowState::Floating);

        assert_eq!(s.visible_windows(&srf).count(), 3);
        assert_eq!(s.visible_tiles(&srf).map(|w| w.id.0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(
            s.visible_tileables(&srf).map(|w| w.id.0).collect::<Vec<_>>(),
            vec![1, 2]
        );
    }
}
