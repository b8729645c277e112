//! The interview problem shown on the page and shared with the assistant.

/// A fixed coding problem with its starter code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Problem {
    /// Short title used in chat messages
    pub title: &'static str,
    /// Full statement rendered in the left panel
    pub statement: &'static str,
    /// Code the editor starts with
    pub starter_code: &'static str,
    /// Language tag for the editor and context updates
    pub language: &'static str,
}

impl Problem {
    /// Human-readable language name for panel headings
    pub fn language_label(&self) -> &'static str {
        match self.language {
            "cpp" => "C++",
            "python" => "Python",
            "rust" => "Rust",
            other => other,
        }
    }
}

impl Default for Problem {
    fn default() -> Self {
        TWO_SUM
    }
}

pub const TWO_SUM: Problem = Problem {
    title: "Two Sum",
    statement: TWO_SUM_STATEMENT,
    starter_code: TWO_SUM_STARTER,
    language: "cpp",
};

const TWO_SUM_STATEMENT: &str = "
Problem Statement — Two Sum

Description:
Given an array of integers nums and an integer target, return the indices of the two numbers such that they add up to target.

You may assume that each input would have exactly one solution, and you may not use the same element twice. You can return the answer in any order.

Example 1:
Input: nums = [2, 7, 11, 15], target = 9
Output: [0, 1]

Example 2:
Input: nums = [3, 2, 4], target = 6
Output: [1, 2]

Example 3:
Input: nums = [3, 3], target = 6
Output: [0, 1]

Constraints:
- 2 <= nums.length <= 10^4
- -1 <= nums[i] <= 10^9
- -1 <= target <= 10^9
- Exactly one valid answer exists
- Cannot use the same element twice
";

const TWO_SUM_STARTER: &str = "vector<int> twoSum(vector<int>& nums, int target) {
    // Write your code here
    return {};
}
";
