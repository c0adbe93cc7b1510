use std::num::NonZeroUsize;
use std::slice::Chunks;

/// Разбить последовательность на пачки по `size` элементов.
///
/// Все пачки, кроме последней, содержат ровно `size` элементов; для пустого
/// входа пачек нет.
pub fn batches<T>(items: &[T], size: NonZeroUsize) -> Chunks<'_, T> {
    items.chunks(size.get())
}

/// Число пачек, которое вернёт [`batches`]
pub fn batch_count(len: usize, size: NonZeroUsize) -> usize {
    len.div_ceil(size.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_divide_with_remainder() {
        let items = [1, 2, 3, 4, 5];
        let chunks: Vec<&[i32]> = batches(&items, nz(2)).collect();
        assert_eq!(chunks, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
        assert_eq!(batch_count(items.len(), nz(2)), 3);
    }

    #[test]
    fn test_empty_input_has_no_batches() {
        let items: [i32; 0] = [];
        assert_eq!(batches(&items, nz(2)).count(), 0);
        assert_eq!(batch_count(0, nz(2)), 0);
    }

    #[test]
    fn test_concatenation_reproduces_input() {
        let items: Vec<u32> = (0..1234).collect();
        for size in [1, 7, 100, 1234, 5000] {
            let chunks: Vec<&[u32]> = batches(&items, nz(size)).collect();
            assert_eq!(chunks.len(), batch_count(items.len(), nz(size)));

            let (last, full) = chunks.split_last().unwrap();
            assert!(full.iter().all(|c| c.len() == size));
            assert!(!last.is_empty() && last.len() <= size);

            let joined: Vec<u32> = chunks.concat();
            assert_eq!(joined, items);
        }
    }

    #[test]
    fn test_batches_are_restartable() {
        let items = ["a", "b", "c"];
        let first: Vec<_> = batches(&items, nz(2)).collect();
        let second: Vec<_> = batches(&items, nz(2)).collect();
        assert_eq!(first, second);
    }
}
