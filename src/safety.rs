use crate::error::BankError;

// 安全性チェック
// 渡された行列だけを見る関数なので、実際の状態にも仮の状態にも使える

// 行列の形が available と揃っているか
fn check_dimensions(
    available: &[usize],
    allocation: &[Vec<usize>],
    need: &[Vec<usize>],
) -> Result<(), BankError> {
    if need.len() != allocation.len() {
        return Err(BankError::DimensionMismatch {
            expected: allocation.len(),
            actual: need.len(),
        });
    }
    if let Some(row) = allocation
        .iter()
        .chain(need)
        .find(|row| row.len() != available.len())
    {
        return Err(BankError::DimensionMismatch {
            expected: available.len(),
            actual: row.len(),
        });
    }
    Ok(())
}

// 安全系列を探す
// すべてのプロセスを終わらせられる順番が見つかればそれを返し、見つからなければ None
pub fn safe_sequence(
    available: &[usize],
    allocation: &[Vec<usize>],
    need: &[Vec<usize>],
) -> Result<Option<Vec<usize>>, BankError> {
    check_dimensions(available, allocation, need)?;
    let num_processes = allocation.len();

    // 利用可能なリソースのシミュレート値
    let mut work = available.to_vec();
    let mut finish = vec![false; num_processes];
    let mut sequence = Vec::with_capacity(num_processes);

    while sequence.len() < num_processes {
        let prev_len = sequence.len();

        // 1 回のパスで条件を満たすものは index 順に全部入れる
        // 途中で break すると後ろのプロセスを次のパスまで見ないだけで、判定結果は変わらない
        for (i, (aloc, need_i)) in allocation.iter().zip(need).enumerate() {
            if finish[i] {
                continue;
            }

            let is_available = work.iter().zip(need_i).all(|(w, n)| *w >= *n);
            if is_available {
                // 必要なリソースをすべて借り切ったら全部返却されるので、work に足す
                for (w, a) in work.iter_mut().zip(aloc) {
                    *w = w.checked_add(*a).ok_or(BankError::Overflow)?;
                }
                finish[i] = true;
                sequence.push(i);
            }
        }

        // 1 つも増えなかったら、それ以上回しても同じ
        if sequence.len() == prev_len {
            return Ok(None);
        }
    }

    Ok(Some(sequence))
}

// 現在の状態がデッドロックに陥りうる状態でないか
pub fn is_safe(
    available: &[usize],
    allocation: &[Vec<usize>],
    need: &[Vec<usize>],
) -> Result<bool, BankError> {
    Ok(safe_sequence(available, allocation, need)?.is_some())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_safe() {
        let available = [0, 1];
        let allocation = vec![vec![1, 0], vec![0, 0]];
        let need = vec![vec![0, 1], vec![1, 1]];

        assert!(is_safe(&available, &allocation, &need).unwrap());
        assert_eq!(
            safe_sequence(&available, &allocation, &need).unwrap(),
            Some(vec![0, 1])
        );
    }

    #[test]
    fn test_is_safe2() {
        let available = [0, 1];
        let allocation = vec![vec![0, 0], vec![1, 0]];
        let need = vec![vec![1, 1], vec![0, 1]];

        assert!(is_safe(&available, &allocation, &need).unwrap());
        // 0 番は 1 番が返すまで待たされる
        assert_eq!(
            safe_sequence(&available, &allocation, &need).unwrap(),
            Some(vec![1, 0])
        );
    }

    #[test]
    fn test_unsafe() {
        // 2 人の哲学者が箸を 1 本ずつ持っている状態
        let available = [0, 0];
        let allocation = vec![vec![1, 0], vec![0, 1]];
        let need = vec![vec![0, 1], vec![1, 0]];

        assert!(!is_safe(&available, &allocation, &need).unwrap());
        assert_eq!(safe_sequence(&available, &allocation, &need).unwrap(), None);
    }

    #[test]
    fn test_same_pass_in_index_order() {
        // 最初のパスで 0 と 2 が入り、2 の返却で 1 が次のパスに入る
        let available = [1];
        let allocation = vec![vec![0], vec![0], vec![2]];
        let need = vec![vec![1], vec![3], vec![1]];

        assert_eq!(
            safe_sequence(&available, &allocation, &need).unwrap(),
            Some(vec![0, 2, 1])
        );
    }

    #[test]
    fn test_no_process() {
        assert_eq!(safe_sequence(&[3], &[], &[]), Ok(Some(vec![])));
    }

    #[test]
    fn test_classic_initial_state() {
        let available = [3, 14, 11, 12];
        let need = vec![
            vec![0, 0, 1, 2],
            vec![1, 7, 5, 0],
            vec![2, 3, 5, 6],
            vec![0, 6, 5, 2],
            vec![0, 6, 5, 6],
        ];
        let allocation = vec![vec![0; 4]; 5];

        // 何も割り当てていないので、全員 max 以下の available で一発で通る
        assert_eq!(
            safe_sequence(&available, &allocation, &need).unwrap(),
            Some(vec![0, 1, 2, 3, 4])
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        // 2 種類目のリソースが無視されて safe と判定されてはいけない
        assert_eq!(
            is_safe(&[0], &[vec![5]], &[vec![0, 1]]),
            Err(BankError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        );
        assert_eq!(
            safe_sequence(&[1, 1], &[vec![0, 0]], &[]),
            Err(BankError::DimensionMismatch {
                expected: 1,
                actual: 0
            })
        );
    }

    #[test]
    fn test_overflow() {
        let available = [usize::MAX];
        let allocation = vec![vec![1]];
        let need = vec![vec![0]];

        assert_eq!(
            is_safe(&available, &allocation, &need),
            Err(BankError::Overflow)
        );
    }
}
