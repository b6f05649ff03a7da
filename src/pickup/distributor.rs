// Moves drops into a container and collects what does not fit

use super::inventory::Container;
use super::item::ItemStack;

/// Insert each stack in order; earlier stacks get first claim on free space
/// Returns the overflow (whole stacks or remainders) in input order
pub fn distribute(container: &mut dyn Container, stacks: &[ItemStack]) -> Vec<ItemStack> {
    let mut overflow = Vec::new();

    for stack in stacks {
        if stack.is_empty() {
            continue;
        }

        let remainder = container.try_insert(stack.clone());
        if !remainder.is_empty() {
            overflow.push(remainder);
        }
    }

    overflow
}

/// Sum of quantities across stacks
pub fn total_quantity(stacks: &[ItemStack]) -> u64 {
    stacks.iter().map(|stack| stack.quantity as u64).sum()
}
